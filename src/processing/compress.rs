//! Lossy compression simulation.
//!
//! Runs the raster through an in-memory JPEG encode/decode round trip at
//! the stage's quality setting. The block-DCT quantization is what puts
//! the characteristic blockiness and ringing into the training pairs; the
//! compressed bytes themselves are thrown away.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageFormat};

use crate::error::{DegradeError, Result};

use super::ImageBuf;

/// Re-encode `img` as JPEG at `quality` (1..=100) and decode it back.
pub fn simulate_compression(img: &ImageBuf, quality: u8) -> Result<ImageBuf> {
    let bytes = img.to_rgb8_bytes();

    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut encoded), quality);
    encoder
        .encode(&bytes, img.w, img.h, ExtendedColorType::Rgb8)
        .map_err(|e| DegradeError::Config(format!("jpeg encode failed: {e}")))?;

    let decoded = image::load_from_memory_with_format(&encoded, ImageFormat::Jpeg)
        .map_err(|e| DegradeError::Config(format!("jpeg decode failed: {e}")))?;

    Ok(ImageBuf::from_rgb8(&decoded.to_rgb8()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> ImageBuf {
        let img = image::RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([
                (x * 255 / w.max(1)) as u8,
                (y * 255 / h.max(1)) as u8,
                ((x + y) * 255 / (w + h)) as u8,
            ])
        });
        ImageBuf::from_rgb8(&img)
    }

    #[test]
    fn dimensions_are_preserved() {
        let img = gradient(33, 17);
        let out = simulate_compression(&img, 50).unwrap();
        assert_eq!((out.w, out.h), (33, 17));
        assert_eq!(out.data.len(), img.data.len());
    }

    #[test]
    fn low_quality_distorts_more_than_high_quality() {
        let img = gradient(64, 64);
        let err = |a: &ImageBuf, b: &ImageBuf| -> f64 {
            a.data
                .iter()
                .zip(&b.data)
                .map(|(x, y)| ((x - y) as f64).powi(2))
                .sum::<f64>()
        };
        let q10 = simulate_compression(&img, 10).unwrap();
        let q90 = simulate_compression(&img, 90).unwrap();
        assert!(err(&img, &q10) > err(&img, &q90));
    }

    #[test]
    fn flat_image_survives_nearly_unchanged_at_high_quality() {
        let img = ImageBuf::from_raw(32, 32, vec![0.5; 32 * 32 * 3]);
        let out = simulate_compression(&img, 95).unwrap();
        for (&a, &b) in img.data.iter().zip(&out.data) {
            assert!((a - b).abs() < 0.02);
        }
    }

    #[test]
    fn output_stays_in_unit_range() {
        let img = gradient(24, 24);
        let out = simulate_compression(&img, 5).unwrap();
        assert!(out.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
