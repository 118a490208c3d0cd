//! # Image Processing Stages
//!
//! The per-image half of the pipeline: a float raster type plus the four
//! stage operations (convolve, resize, noise, compression) that the
//! orchestrator chains twice per profile.
//!
//! All stages operate on [`ImageBuf`], an interleaved RGB `f32` raster
//! normalized to `[0, 1]`. Decoding and encoding to 8-bit happen only at
//! the pipeline boundary; everything in between stays in float so repeated
//! quantization does not leak into the math.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageError, ImageFormat};

use crate::error::{DegradeError, Result};

pub mod compress;
pub mod convolve;
pub mod noise;
pub mod resize;

/// Interleaved RGB float raster, samples in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct ImageBuf {
    pub w: u32,
    pub h: u32,
    /// `h * w * 3` samples, row-major, RGB interleaved.
    pub data: Vec<f32>,
}

impl ImageBuf {
    /// Wrap raw normalized samples. `data.len()` must equal `h * w * 3`.
    pub fn from_raw(w: u32, h: u32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), (w * h * 3) as usize);
        Self { w, h, data }
    }

    /// Decode any supported image file and normalize to float RGB.
    pub fn load(path: &Path) -> Result<Self> {
        let decoded = image::open(path).map_err(|source| DegradeError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_rgb8(&decoded.to_rgb8()))
    }

    /// Normalize an 8-bit RGB image to float.
    pub fn from_rgb8(img: &image::RgbImage) -> Self {
        let data = img.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Self {
            w: img.width(),
            h: img.height(),
            data,
        }
    }

    /// Denormalize to 8-bit samples (clipped and rounded).
    pub fn to_rgb8_bytes(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    /// Persist under `path`. JPEG extensions are written at quality 100;
    /// every other extension goes through the `image` crate's lossless
    /// encoders (PNG, TIFF, ...).
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_rgb8_bytes();
        let write_err = |source: ImageError| DegradeError::Write {
            path: path.to_path_buf(),
            source,
        };
        match ImageFormat::from_path(path) {
            Ok(ImageFormat::Jpeg) => {
                let file = File::create(path).map_err(|e| write_err(ImageError::IoError(e)))?;
                let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), 100);
                encoder
                    .encode(&bytes, self.w, self.h, ExtendedColorType::Rgb8)
                    .map_err(write_err)
            }
            _ => image::save_buffer(path, &bytes, self.w, self.h, ExtendedColorType::Rgb8)
                .map_err(write_err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_denormalize_round_trips() {
        let img = image::RgbImage::from_fn(4, 3, |x, y| {
            image::Rgb([(x * 20) as u8, (y * 40) as u8, 128])
        });
        let buf = ImageBuf::from_rgb8(&img);
        assert_eq!(buf.w, 4);
        assert_eq!(buf.h, 3);
        assert_eq!(buf.to_rgb8_bytes(), img.as_raw().as_slice());
    }

    #[test]
    fn denormalize_clips_out_of_range_samples() {
        let buf = ImageBuf::from_raw(1, 1, vec![-0.5, 0.5, 1.7]);
        assert_eq!(buf.to_rgb8_bytes(), vec![0, 128, 255]);
    }

    #[test]
    fn load_missing_file_is_a_decode_error() {
        let err = ImageBuf::load(Path::new("/nonexistent/missing.png")).unwrap_err();
        assert!(matches!(err, DegradeError::Decode { .. }));
    }
}
