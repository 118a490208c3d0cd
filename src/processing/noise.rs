//! Synthetic sensor noise injection.
//!
//! Each call rolls one of two noise models per the stage configuration:
//!
//! - **Gaussian**: zero-mean noise with sigma drawn from the configured
//!   range (expressed in 8-bit units, so divided by 255 before use).
//! - **Poisson**: shot noise. The image is quantized to its 8-bit levels,
//!   the level count rounded up to a power of two becomes the photon
//!   budget `vals`, and each sample is replaced by
//!   `Poisson(value * vals) / vals`; the difference, scaled by a draw from
//!   the configured range, is the noise.
//!
//! Both models have a gray variant (one noise plane applied to all three
//! channels; for Poisson the plane is derived from the luma projection)
//! chosen with `gray_noise_prob`. Results are clipped to `[0, 1]`.

use rand::Rng;
use rand_distr::{Distribution, Poisson, StandardNormal};

use crate::config::StageConfig;

use super::ImageBuf;

/// BT.601 luma weights over RGB, matching the usual 8-bit gray conversion.
const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

/// Inject one round of noise into `img` in place.
pub fn add_noise<R: Rng + ?Sized>(img: &mut ImageBuf, stage: &StageConfig, rng: &mut R) {
    if rng.gen::<f64>() < stage.gaussian_noise_prob {
        let (lo, hi) = stage.gaussian_sigma_range;
        let sigma = (rng.gen_range(lo..hi) / 255.0) as f32;
        let gray = rng.gen::<f64>() < stage.gray_noise_prob;
        add_gaussian_noise(img, sigma, gray, rng);
    } else {
        let (lo, hi) = stage.poisson_scale_range;
        let scale = rng.gen_range(lo..hi) as f32;
        let gray = rng.gen::<f64>() < stage.gray_noise_prob;
        add_poisson_noise(img, scale, gray, rng);
    }
    for v in &mut img.data {
        *v = v.clamp(0.0, 1.0);
    }
}

fn add_gaussian_noise<R: Rng + ?Sized>(img: &mut ImageBuf, sigma: f32, gray: bool, rng: &mut R) {
    if gray {
        for px in img.data.chunks_exact_mut(3) {
            let n: f64 = rng.sample(StandardNormal);
            let n = n as f32 * sigma;
            px[0] += n;
            px[1] += n;
            px[2] += n;
        }
    } else {
        for v in &mut img.data {
            let n: f64 = rng.sample(StandardNormal);
            *v += n as f32 * sigma;
        }
    }
}

fn add_poisson_noise<R: Rng + ?Sized>(img: &mut ImageBuf, scale: f32, gray: bool, rng: &mut R) {
    if gray {
        let luma: Vec<f32> = img
            .data
            .chunks_exact(3)
            .map(|px| quantize(px[0] * LUMA[0] + px[1] * LUMA[1] + px[2] * LUMA[2]))
            .collect();
        let vals = photon_budget(&luma);
        for (px, &q) in img.data.chunks_exact_mut(3).zip(&luma) {
            let noise = (poisson_sample(q as f64 * vals, rng) / vals) as f32 - q;
            let noise = noise * scale;
            px[0] += noise;
            px[1] += noise;
            px[2] += noise;
        }
    } else {
        let quantized: Vec<f32> = img.data.iter().map(|&v| quantize(v)).collect();
        let vals = photon_budget(&quantized);
        for (v, &q) in img.data.iter_mut().zip(&quantized) {
            let noise = (poisson_sample(q as f64 * vals, rng) / vals) as f32 - q;
            *v += noise * scale;
        }
    }
}

/// Snap a normalized sample to its 8-bit level.
#[inline]
fn quantize(v: f32) -> f32 {
    (v * 255.0).round().clamp(0.0, 255.0) / 255.0
}

/// Number of distinct 8-bit levels, rounded up to a power of two.
fn photon_budget(quantized: &[f32]) -> f64 {
    let mut seen = [false; 256];
    for &q in quantized {
        seen[(q * 255.0).round() as usize] = true;
    }
    let distinct = seen.iter().filter(|&&s| s).count().max(1);
    2f64.powf((distinct as f64).log2().ceil())
}

/// Poisson draw that tolerates a zero rate (always zero counts).
#[inline]
fn poisson_sample<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> f64 {
    if lambda <= 0.0 {
        return 0.0;
    }
    Poisson::new(lambda).map(|d| d.sample(rng)).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stage(gaussian_noise_prob: f64, gray_noise_prob: f64) -> StageConfig {
        StageConfig {
            kernel_list: vec![degrade_kernels::KernelFamily::Iso],
            kernel_prob: vec![1.0],
            blur_sigma: (0.2, 3.0),
            betag_range: (0.5, 4.0),
            betap_range: (0.9, 2.0),
            sinc_prob: 0.0,
            gaussian_noise_prob,
            gray_noise_prob,
            gaussian_sigma_range: (1.0, 30.0),
            poisson_scale_range: (0.05, 3.0),
            jpeg_quality: 90,
        }
    }

    fn mid_gray(w: u32, h: u32) -> ImageBuf {
        ImageBuf::from_raw(w, h, vec![0.5; (w * h * 3) as usize])
    }

    #[test]
    fn gaussian_noise_perturbs_the_image() {
        let mut img = mid_gray(16, 16);
        let mut rng = StdRng::seed_from_u64(1);
        add_noise(&mut img, &stage(1.0, 0.0), &mut rng);
        assert!(img.data.iter().any(|&v| (v - 0.5).abs() > 1e-4));
    }

    #[test]
    fn gray_gaussian_noise_is_identical_across_channels() {
        let mut img = mid_gray(16, 16);
        let mut rng = StdRng::seed_from_u64(2);
        add_noise(&mut img, &stage(1.0, 1.0), &mut rng);
        for px in img.data.chunks_exact(3) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn color_gaussian_noise_differs_across_channels() {
        let mut img = mid_gray(16, 16);
        let mut rng = StdRng::seed_from_u64(3);
        add_noise(&mut img, &stage(1.0, 0.0), &mut rng);
        assert!(img
            .data
            .chunks_exact(3)
            .any(|px| px[0] != px[1] || px[1] != px[2]));
    }

    #[test]
    fn poisson_noise_perturbs_the_image() {
        let mut img = mid_gray(16, 16);
        let mut rng = StdRng::seed_from_u64(4);
        add_noise(&mut img, &stage(0.0, 0.0), &mut rng);
        assert!(img.data.iter().any(|&v| (v - 0.5).abs() > 1e-4));
    }

    #[test]
    fn gray_poisson_noise_is_identical_across_channels() {
        let mut img = mid_gray(16, 16);
        let mut rng = StdRng::seed_from_u64(5);
        add_noise(&mut img, &stage(0.0, 1.0), &mut rng);
        for px in img.data.chunks_exact(3) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn output_is_clipped_to_unit_range() {
        let mut img = ImageBuf::from_raw(8, 8, vec![0.99; 8 * 8 * 3]);
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..8 {
            add_noise(&mut img, &stage(1.0, 0.0), &mut rng);
        }
        assert!(img.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn black_image_survives_poisson_noise() {
        // Zero-rate Poisson draws must not panic or produce NaN.
        let mut img = ImageBuf::from_raw(8, 8, vec![0.0; 8 * 8 * 3]);
        let mut rng = StdRng::seed_from_u64(7);
        add_noise(&mut img, &stage(0.0, 0.5), &mut rng);
        assert!(img.data.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let make = |seed| {
            let mut img = mid_gray(12, 12);
            let mut rng = StdRng::seed_from_u64(seed);
            add_noise(&mut img, &stage(0.5, 0.5), &mut rng);
            img.data
        };
        assert_eq!(make(42), make(42));
    }
}
