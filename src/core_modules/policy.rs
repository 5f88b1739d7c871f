// THEORY:
// A classification policy is the only part of a mask filter with domain content.
// It is a pure function from one RGB triple to either a replacement triple (the
// pixel glows) or nothing (the pixel is masked to black). Every policy is a small
// struct whose fields are its thresholds, and whose `Default` carries the tuned
// values the published masks were produced with.
//
// `classify_buffer` is the shared scan: it walks an interleaved RGB buffer in
// strides of three and rewrites each triple in place, so the output keeps the
// exact shape of the input.

use crate::core_modules::pixel::pixel::{scale_channel, Channel, Pixel, CHANNELS};
use crate::error::{EmissiveError, Result};

/// A per-pixel emissive classifier.
pub trait EmissivePolicy {
    /// `Some(replacement)` when the pixel is part of the emissive feature.
    fn classify(&self, pixel: &Pixel) -> Option<Pixel>;

    /// The triple written back into the mask for `pixel`.
    fn remap(&self, pixel: &Pixel) -> Pixel {
        self.classify(pixel).unwrap_or(Pixel::BLACK)
    }
}

/// Near-white pixels become a flat icy blue.
#[derive(Debug, Clone)]
pub struct IcePolicy {
    pub min_channel: Channel,
    pub color: Pixel,
}

impl Default for IcePolicy {
    fn default() -> Self {
        Self {
            min_channel: 250,
            color: Pixel::new(0, 191, 255),
        }
    }
}

impl EmissivePolicy for IcePolicy {
    fn classify(&self, pixel: &Pixel) -> Option<Pixel> {
        (pixel.min_channel() >= self.min_channel).then_some(self.color)
    }
}

/// Purple and cyan regions, each pushed further toward its hue.
///
/// Cyan wins when a pixel scores on both.
#[derive(Debug, Clone)]
pub struct MythicPolicy {
    pub purple_threshold: f32,
    pub cyan_threshold: f32,
    /// (red, green, blue) multipliers for cyan pixels.
    pub cyan_gain: (f32, f32, f32),
    /// (red, green, blue) multipliers for purple pixels.
    pub purple_gain: (f32, f32, f32),
}

impl Default for MythicPolicy {
    fn default() -> Self {
        Self {
            purple_threshold: 10.0,
            cyan_threshold: 15.0,
            cyan_gain: (0.05, 1.25, 1.35),
            purple_gain: (1.1, 0.05, 1.2),
        }
    }
}

impl MythicPolicy {
    fn apply_gain(pixel: &Pixel, (red, green, blue): (f32, f32, f32)) -> Pixel {
        Pixel::new(
            scale_channel(pixel.red, red),
            scale_channel(pixel.green, green),
            scale_channel(pixel.blue, blue),
        )
    }
}

impl EmissivePolicy for MythicPolicy {
    fn classify(&self, pixel: &Pixel) -> Option<Pixel> {
        let is_purple = pixel.purple_score() > self.purple_threshold;
        let is_cyan = pixel.cyan_score() > self.cyan_threshold;

        if is_cyan {
            Some(Self::apply_gain(pixel, self.cyan_gain))
        } else if is_purple {
            Some(Self::apply_gain(pixel, self.purple_gain))
        } else {
            None
        }
    }
}

/// Void v1: strongly purple pixels with at least one bright red or blue channel.
#[derive(Debug, Clone)]
pub struct VoidNeonPolicy {
    pub purple_threshold: f32,
    pub channel_floor: Channel,
}

impl Default for VoidNeonPolicy {
    fn default() -> Self {
        Self {
            purple_threshold: 55.0,
            channel_floor: 60,
        }
    }
}

impl EmissivePolicy for VoidNeonPolicy {
    fn classify(&self, pixel: &Pixel) -> Option<Pixel> {
        let is_neon = pixel.purple_score() > self.purple_threshold
            && (pixel.red > self.channel_floor || pixel.blue > self.channel_floor);
        is_neon.then_some(*pixel)
    }
}

/// Void v5: vivid violet by channel ratio, plus the bright pinkish-white core.
#[derive(Debug, Clone)]
pub struct VoidVibrantPolicy {
    pub blue_over_green: f32,
    pub red_over_green: f32,
    pub saturation_floor: u16,
    /// Exclusive (red, green, blue) floors for the core highlight.
    pub core_floor: Pixel,
}

impl Default for VoidVibrantPolicy {
    fn default() -> Self {
        Self {
            blue_over_green: 3.0,
            red_over_green: 1.8,
            saturation_floor: 130,
            core_floor: Pixel::new(200, 150, 200),
        }
    }
}

impl VoidVibrantPolicy {
    pub fn has_high_saturation(&self, pixel: &Pixel) -> bool {
        pixel.channel_sum_rb() > self.saturation_floor
    }
}

impl EmissivePolicy for VoidVibrantPolicy {
    fn classify(&self, pixel: &Pixel) -> Option<Pixel> {
        let green = pixel.green as f32;
        let is_vibrant_purple = pixel.blue as f32 > green * self.blue_over_green
            && pixel.red as f32 > green * self.red_over_green;
        // Not part of the gate: masks produced with this filter never used it.
        let _has_high_saturation = self.has_high_saturation(pixel);
        let is_core = pixel.red > self.core_floor.red
            && pixel.green > self.core_floor.green
            && pixel.blue > self.core_floor.blue;

        (is_vibrant_purple || is_core).then_some(*pixel)
    }
}

/// Void v10: anything brighter than a luma threshold.
#[derive(Debug, Clone)]
pub struct VoidLumaPolicy {
    pub min_luminance: f64,
}

impl Default for VoidLumaPolicy {
    fn default() -> Self {
        Self { min_luminance: 120.0 }
    }
}

impl EmissivePolicy for VoidLumaPolicy {
    fn classify(&self, pixel: &Pixel) -> Option<Pixel> {
        (pixel.luminance() > self.min_luminance).then_some(*pixel)
    }
}

/// Counts gathered while a buffer is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskStats {
    pub total_pixels: usize,
    pub emissive_pixels: usize,
}

impl MaskStats {
    /// Fraction of pixels kept by the policy, 0.0 for an empty image.
    pub fn coverage(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        self.emissive_pixels as f64 / self.total_pixels as f64
    }
}

/// Rewrites every RGB triple of `buffer` in place through `policy`.
pub fn classify_buffer<P>(buffer: &mut [u8], policy: &P) -> Result<MaskStats>
where
    P: EmissivePolicy + ?Sized,
{
    if buffer.len() % CHANNELS != 0 {
        return Err(EmissiveError::BufferSizeMismatch {
            expected: buffer.len() / CHANNELS * CHANNELS,
            got: buffer.len(),
        });
    }

    let mut stats = MaskStats {
        total_pixels: buffer.len() / CHANNELS,
        emissive_pixels: 0,
    };

    for triple in buffer.chunks_exact_mut(CHANNELS) {
        let pixel = Pixel::try_from(&*triple).map_err(|got| EmissiveError::BufferSizeMismatch {
            expected: CHANNELS,
            got,
        })?;
        let output = match policy.classify(&pixel) {
            Some(replacement) => {
                stats.emissive_pixels += 1;
                replacement
            }
            None => Pixel::BLACK,
        };
        let bytes: [u8; CHANNELS] = output.into();
        triple.copy_from_slice(&bytes);
    }

    Ok(stats)
}
