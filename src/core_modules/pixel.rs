// THEORY (single-pixel heuristics):
// The `Pixel` module is the most fundamental unit of the mask filters. It is a
// "dumb" data container for one RGB sample triple plus the handful of scalar
// scores the classification policies are written in terms of. Nothing here looks
// at neighbours; anything spatial (the blur) happens after classification, on the
// whole buffer.
//
// Scores:
// - Luminance:    Rec. 601 luma, 0.299R + 0.587G + 0.114B
// - Purple score: (R + B) / 2 - G, how far red+blue rise above green
// - Cyan score:   (G + B) / 2 - R, how far green+blue rise above red
//
// Scaling a channel by a factor always clamps to [0, 255] and truncates toward
// zero. The cast is the rounding rule; it is applied everywhere a policy
// rescales a channel.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type ComputedChannel = f32;
    pub type Score = f32;
    pub type Luminance = f64;

    pub const CHANNELS: usize = 3;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub const BLACK: Pixel = Pixel::new(0, 0, 0);

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        #[inline]
        fn computed(channel: Channel) -> ComputedChannel {
            channel as ComputedChannel
        }

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        /// `(R + B) / 2 - G`. Positive for magenta/violet hues.
        pub fn purple_score(&self) -> Score {
            (Self::computed(self.red) + Self::computed(self.blue)) / 2.0 - Self::computed(self.green)
        }

        /// `(G + B) / 2 - R`. Positive for teal/cyan hues.
        pub fn cyan_score(&self) -> Score {
            (Self::computed(self.green) + Self::computed(self.blue)) / 2.0 - Self::computed(self.red)
        }

        /// Plain `R + B`, without the averaging of `purple_score`.
        pub fn channel_sum_rb(&self) -> u16 {
            self.red as u16 + self.blue as u16
        }

        pub fn min_channel(&self) -> Channel {
            self.red.min(self.green).min(self.blue)
        }
    }

    /// Multiplies a channel by `factor`, clamping to [0, 255] and truncating.
    #[inline]
    pub fn scale_channel(value: Channel, factor: ComputedChannel) -> Channel {
        (value as ComputedChannel * factor).clamp(0.0, 255.0) as Channel
    }

    impl TryFrom<&[Byte]> for Pixel {
        type Error = usize;

        /// Fails with the offending slice length.
        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            match bytes {
                [red, green, blue] => Ok(Pixel::new(*red, *green, *blue)),
                _ => Err(bytes.len()),
            }
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue]
        }
    }
}
