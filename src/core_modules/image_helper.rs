// THEORY:
// Thin wrappers around the `image` crate for the two ends of a filter run.
// `load` turns a texture file of any supported format into a raw, row-major,
// interleaved RGB buffer; `save` writes such a buffer back out as a PNG. The
// optional Gaussian blur sits between classification and `save`.
//
// A mask is encoded fully in memory, written to a temp file next to the target
// and renamed over it. A failed encode or write leaves any previous mask intact.

pub mod image_helper {
    use crate::core_modules::pixel::pixel::CHANNELS;
    use crate::error::{EmissiveError, Result};
    use image::{ExtendedColorType, ImageEncoder, RgbImage};
    use std::io::Write;
    use std::path::Path;

    /// A decoded RGB8 image: `buffer.len() == width * height * 3`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RawImage {
        pub width: u32,
        pub height: u32,
        pub buffer: Vec<u8>,
    }

    impl RawImage {
        pub fn new(width: u32, height: u32, buffer: Vec<u8>) -> Result<Self> {
            let raw = Self {
                width,
                height,
                buffer,
            };
            raw.check_len()?;
            Ok(raw)
        }

        fn check_len(&self) -> Result<()> {
            let expected = self.width as usize * self.height as usize * CHANNELS;
            if self.buffer.len() != expected {
                return Err(EmissiveError::BufferSizeMismatch {
                    expected,
                    got: self.buffer.len(),
                });
            }
            Ok(())
        }

        fn into_rgb_image(self) -> Result<RgbImage> {
            self.check_len()?;
            let (width, height, got) = (self.width, self.height, self.buffer.len());
            RgbImage::from_raw(width, height, self.buffer).ok_or(EmissiveError::BufferSizeMismatch {
                expected: width as usize * height as usize * CHANNELS,
                got,
            })
        }
    }

    impl From<RgbImage> for RawImage {
        fn from(image: RgbImage) -> Self {
            let (width, height) = image.dimensions();
            Self {
                width,
                height,
                buffer: image.into_raw(),
            }
        }
    }

    /// Decodes `path` into an RGB8 buffer, flattening alpha and grayscale sources.
    pub fn load(path: &Path) -> Result<RawImage> {
        if !path.exists() {
            return Err(EmissiveError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        // Format comes from the file's magic bytes, not its extension.
        let decoded = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|source| EmissiveError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!(
            "decoded {} as {:?} ({}x{})",
            path.display(),
            decoded.color(),
            decoded.width(),
            decoded.height()
        );

        Ok(decoded.to_rgb8().into())
    }

    /// Gaussian blur with the given sigma, applied to every channel alike.
    pub fn blur(raw: RawImage, sigma: f32) -> Result<RawImage> {
        let image = raw.into_rgb_image()?;
        Ok(image::imageops::blur(&image, sigma).into())
    }

    /// Encodes `raw` as an RGB8 PNG in memory.
    pub fn encode_png(raw: &RawImage) -> Result<Vec<u8>> {
        raw.check_len()?;
        let mut bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
        encoder
            .write_image(&raw.buffer, raw.width, raw.height, ExtendedColorType::Rgb8)
            .map_err(EmissiveError::Encode)?;
        Ok(bytes)
    }

    /// Writes `raw` to `path` as a PNG, replacing whatever was there.
    pub fn save(path: &Path, raw: &RawImage) -> Result<()> {
        let bytes = encode_png(raw)?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = tempfile::NamedTempFile::new_in(directory)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}
