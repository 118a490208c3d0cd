// SPDX-License-Identifier: MIT
//! # Blur Kernel Families
//!
//! Parametric bivariate blur kernels used by the degradation mixture:
//!
//! 1. **Gaussian** (`iso`/`aniso`): exp(-0.5 * q^T S^-1 q)
//! 2. **Generalized Gaussian** (`generalized_*`): exp(-0.5 * (q^T S^-1 q)^beta)
//! 3. **Plateau** (`plateau_*`): 1 / (1 + (q^T S^-1 q)^beta)
//!
//! where `q` ranges over the centered integer grid and `S` is the covariance
//! built from `(sigma_x, sigma_y, theta)`. Isotropic variants pin
//! `sigma_y = sigma_x` and `theta = 0`; anisotropic variants draw both.
//! All kernels are normalized to unit sum.
//!
//! Family selection is a weighted draw over the configured tag list, so a
//! stage config can bias toward heavy-tailed blurs (plateau) or classic
//! Gaussians without code changes.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Deserialize;
use std::f64::consts::PI;

use crate::{Kernel, KernelError, KernelParams};

/// The closed set of kernel family tags understood by the mixture.
/// Tag spellings match the configuration document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelFamily {
    /// Isotropic Gaussian
    Iso,
    /// Anisotropic (rotated, elliptical) Gaussian
    Aniso,
    /// Isotropic generalized Gaussian
    GeneralizedIso,
    /// Anisotropic generalized Gaussian
    GeneralizedAniso,
    /// Isotropic plateau
    PlateauIso,
    /// Anisotropic plateau
    PlateauAniso,
}

impl KernelFamily {
    fn is_anisotropic(self) -> bool {
        matches!(
            self,
            KernelFamily::Aniso | KernelFamily::GeneralizedAniso | KernelFamily::PlateauAniso
        )
    }
}

/// Draw one kernel from the weighted family mixture.
///
/// Draw order is fixed (family, sigma_x, [sigma_y, theta], [beta]) so that a
/// seeded generator reproduces the same kernel across runs.
pub fn sample_mixture<R: Rng + ?Sized>(
    params: &KernelParams,
    rng: &mut R,
) -> Result<Kernel, KernelError> {
    let index = WeightedIndex::new(&params.kernel_prob)
        .map_err(|_| KernelError::InvalidWeights(params.kernel_prob.clone()))?;
    let family = params.kernel_list[index.sample(rng)];

    let (lo, hi) = params.blur_sigma;
    let sigma_x = rng.gen_range(lo..hi);
    let (sigma_y, theta) = if family.is_anisotropic() {
        (rng.gen_range(lo..hi), rng.gen_range(-PI..PI))
    } else {
        (sigma_x, 0.0)
    };

    let size = params.kernel_size;
    let kernel = match family {
        KernelFamily::Iso | KernelFamily::Aniso => {
            bivariate_gaussian(size, sigma_x, sigma_y, theta)
        }
        KernelFamily::GeneralizedIso | KernelFamily::GeneralizedAniso => {
            let beta = sample_shape(params.betag_range, rng);
            bivariate_generalized_gaussian(size, sigma_x, sigma_y, theta, beta)
        }
        KernelFamily::PlateauIso | KernelFamily::PlateauAniso => {
            let beta = sample_shape(params.betap_range, rng);
            plateau_kernel(size, sigma_x, sigma_y, theta, beta)
        }
    };
    Ok(kernel)
}

/// Shape parameter draw: half the time below 1 (heavier tails), half the
/// time above, uniform within each half of the configured range.
fn sample_shape<R: Rng + ?Sized>(range: (f64, f64), rng: &mut R) -> f64 {
    let (lo, hi) = range;
    if rng.gen::<f64>() < 0.5 {
        rng.gen_range(lo..1.0)
    } else {
        rng.gen_range(1.0..hi)
    }
}

/// Bivariate Gaussian kernel, unit sum.
pub fn bivariate_gaussian(size: usize, sigma_x: f64, sigma_y: f64, theta: f64) -> Kernel {
    grid_kernel(size, sigma_x, sigma_y, theta, |q| (-0.5 * q).exp())
}

/// Bivariate generalized Gaussian kernel with shape `beta`, unit sum.
/// `beta = 1` recovers the plain Gaussian; `beta < 1` gives heavier tails.
pub fn bivariate_generalized_gaussian(
    size: usize,
    sigma_x: f64,
    sigma_y: f64,
    theta: f64,
    beta: f64,
) -> Kernel {
    grid_kernel(size, sigma_x, sigma_y, theta, |q| (-0.5 * q.powf(beta)).exp())
}

/// Plateau-shaped kernel with shape `beta`, unit sum. Flat near the center
/// with a polynomial falloff, modeling out-of-focus style blur.
pub fn plateau_kernel(size: usize, sigma_x: f64, sigma_y: f64, theta: f64, beta: f64) -> Kernel {
    grid_kernel(size, sigma_x, sigma_y, theta, |q| 1.0 / (q.powf(beta) + 1.0))
}

/// Evaluate `profile(q^T S^-1 q)` over the centered grid and normalize.
fn grid_kernel(
    size: usize,
    sigma_x: f64,
    sigma_y: f64,
    theta: f64,
    profile: impl Fn(f64) -> f64,
) -> Kernel {
    debug_assert!(size % 2 == 1, "kernel side must be odd");

    // Inverse covariance of the rotated ellipse: R diag(1/sx^2, 1/sy^2) R^T.
    let (sin_t, cos_t) = theta.sin_cos();
    let (inv_x, inv_y) = (1.0 / (sigma_x * sigma_x), 1.0 / (sigma_y * sigma_y));
    let inv_11 = cos_t * cos_t * inv_x + sin_t * sin_t * inv_y;
    let inv_22 = sin_t * sin_t * inv_x + cos_t * cos_t * inv_y;
    let inv_12 = sin_t * cos_t * (inv_x - inv_y);

    let center = (size - 1) as f64 / 2.0;
    let mut data = vec![0.0f32; size * size];
    let mut sum = 0.0f64;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let q = inv_11 * dx * dx + 2.0 * inv_12 * dx * dy + inv_22 * dy * dy;
            let v = profile(q);
            data[y * size + x] = v as f32;
            sum += v;
        }
    }

    let inv = (1.0 / sum) as f32;
    for v in &mut data {
        *v *= inv;
    }

    Kernel { size, data }
}
