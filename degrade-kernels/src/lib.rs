// SPDX-License-Identifier: MIT
//! # degrade-kernels: Blur Kernel Synthesis & Resolution Planning
//!
//! Pure numeric layer of the second-order degradation pipeline. No image
//! I/O here — only the stochastic kernel construction and the intermediate
//! resolution computation, so the whole crate is testable without touching
//! disk or decoding a single pixel.
//!
//! ## Key Components
//!
//! - [`families`]: parametric kernel families (Gaussian, generalized
//!   Gaussian, plateau) and the weighted mixture over them
//! - [`sinc`]: circular low-pass kernels via a Bessel J1 approximation
//! - [`plan`]: intermediate-resolution planning between HR and LR
//!
//! ## Determinism
//!
//! Every stochastic entry point takes `&mut impl Rng`. There is no hidden
//! generator state in this crate; reproducibility is entirely the caller's
//! seed choice plus a fixed draw order inside each function.
//!
//! ## Usage Example
//!
//! ```rust
//! use degrade_kernels::{synthesize, KernelParams};
//! use degrade_kernels::families::KernelFamily;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let params = KernelParams {
//!     kernel_list: vec![KernelFamily::Iso, KernelFamily::Aniso],
//!     kernel_prob: vec![0.6, 0.4],
//!     kernel_size: 21,
//!     blur_sigma: (0.2, 3.0),
//!     betag_range: (0.5, 4.0),
//!     betap_range: (1.0, 2.0),
//!     sinc_prob: 0.1,
//! };
//! let mut rng = StdRng::seed_from_u64(42);
//! let kernel = synthesize(&params, 21, &mut rng).unwrap();
//! assert_eq!(kernel.size, 21);
//! ```

use rand::Rng;
use std::f64::consts::PI;

pub mod families;
pub mod plan;
pub mod sinc;

pub use families::KernelFamily;
pub use plan::{intermediate_resolution, Resolution};

/// A square 2D convolution filter with odd side length, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    /// Side length in taps (always odd).
    pub size: usize,
    /// Row-major `size * size` taps.
    pub data: Vec<f32>,
}

impl Kernel {
    /// Tap at column `x`, row `y`.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.size + x]
    }

    /// Symmetric zero-pad to side length `target` (odd, >= `self.size`).
    /// Returns the kernel unchanged when it is already at `target`.
    pub fn pad_to(self, target: usize) -> Kernel {
        if self.size == target {
            return self;
        }
        let pad = (target - self.size) / 2;
        let mut data = vec![0.0f32; target * target];
        for y in 0..self.size {
            let src = &self.data[y * self.size..(y + 1) * self.size];
            let dst_row = (y + pad) * target + pad;
            data[dst_row..dst_row + self.size].copy_from_slice(src);
        }
        Kernel { size: target, data }
    }
}

/// Stochastic parameters for one stage's kernel synthesis.
#[derive(Clone, Debug)]
pub struct KernelParams {
    /// Candidate family tags for the mixture draw.
    pub kernel_list: Vec<KernelFamily>,
    /// Selection weights, parallel to `kernel_list`.
    pub kernel_prob: Vec<f64>,
    /// Side length the kernel is generated at (odd, <= the pad target).
    pub kernel_size: usize,
    /// Uniform range for the Gaussian sigma(s).
    pub blur_sigma: (f64, f64),
    /// Shape range for the generalized-Gaussian families.
    pub betag_range: (f64, f64),
    /// Shape range for the plateau families.
    pub betap_range: (f64, f64),
    /// Probability of producing a circular low-pass kernel instead of a
    /// mixture draw.
    pub sinc_prob: f64,
}

#[derive(Debug)]
pub enum KernelError {
    /// Weight vector empty, negative, zero-sum, or mismatched with the
    /// family list.
    InvalidWeights(Vec<f64>),
    /// Kernel side even, zero, or larger than the pad target.
    InvalidSize { kernel_size: usize, max: usize },
}

impl std::fmt::Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::InvalidWeights(w) => {
                write!(f, "invalid kernel family weights {w:?}")
            }
            KernelError::InvalidSize { kernel_size, max } => {
                write!(f, "kernel size {kernel_size} must be odd and <= {max}")
            }
        }
    }
}

impl std::error::Error for KernelError {}

/// Synthesize one blur kernel for a degradation stage.
///
/// With probability `sinc_prob` this is a circular low-pass kernel whose
/// cutoff is drawn from `[pi/3, pi)` for small kernels (< 13 taps) or
/// `[pi/5, pi)` otherwise; else a draw from the weighted family mixture.
/// The result is always zero-padded to `max_kernel_size x max_kernel_size`.
pub fn synthesize<R: Rng + ?Sized>(
    params: &KernelParams,
    max_kernel_size: usize,
    rng: &mut R,
) -> Result<Kernel, KernelError> {
    let size = params.kernel_size;
    if size % 2 == 0 || size == 0 || size > max_kernel_size || max_kernel_size % 2 == 0 {
        return Err(KernelError::InvalidSize {
            kernel_size: size,
            max: max_kernel_size,
        });
    }
    if params.kernel_list.is_empty() || params.kernel_list.len() != params.kernel_prob.len() {
        return Err(KernelError::InvalidWeights(params.kernel_prob.clone()));
    }

    let kernel = if rng.gen::<f64>() < params.sinc_prob {
        let omega_c = if size < 13 {
            rng.gen_range(PI / 3.0..PI)
        } else {
            rng.gen_range(PI / 5.0..PI)
        };
        sinc::circular_lowpass_kernel(omega_c, size)
    } else {
        families::sample_mixture(params, rng)?
    };

    Ok(kernel.pad_to(max_kernel_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn base_params() -> KernelParams {
        KernelParams {
            kernel_list: vec![
                KernelFamily::Iso,
                KernelFamily::Aniso,
                KernelFamily::GeneralizedIso,
                KernelFamily::GeneralizedAniso,
                KernelFamily::PlateauIso,
                KernelFamily::PlateauAniso,
            ],
            kernel_prob: vec![0.45, 0.25, 0.12, 0.03, 0.12, 0.03],
            kernel_size: 21,
            blur_sigma: (0.2, 3.0),
            betag_range: (0.5, 4.0),
            betap_range: (1.0, 2.0),
            sinc_prob: 0.1,
        }
    }

    #[test]
    fn always_padded_to_max_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = base_params();
        for _ in 0..32 {
            let k = synthesize(&params, 21, &mut rng).unwrap();
            assert_eq!(k.size, 21);
            assert_eq!(k.data.len(), 21 * 21);
        }
    }

    #[test]
    fn smaller_kernel_pads_with_zero_border() {
        let mut params = base_params();
        params.kernel_size = 13;
        params.sinc_prob = 0.0;
        let mut rng = StdRng::seed_from_u64(5);
        let k = synthesize(&params, 21, &mut rng).unwrap();
        assert_eq!(k.size, 21);
        // 4-tap border on every side is exactly zero.
        for i in 0..21 {
            assert_eq!(k.at(i, 0), 0.0);
            assert_eq!(k.at(i, 20), 0.0);
            assert_eq!(k.at(0, i), 0.0);
            assert_eq!(k.at(20, i), 0.0);
        }
        // Interior mass survived the padding.
        let sum: f64 = k.data.iter().map(|&v| v as f64).sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn sinc_branch_taken_when_probability_is_one() {
        let mut params = base_params();
        params.sinc_prob = 1.0;
        let mut rng = StdRng::seed_from_u64(11);
        let k = synthesize(&params, 21, &mut rng).unwrap();
        // Sinc kernels ring: some taps are negative, unlike every mixture
        // family which is strictly positive.
        assert!(k.data.iter().any(|&v| v < 0.0));
    }

    #[test]
    fn even_kernel_size_is_rejected() {
        let mut params = base_params();
        params.kernel_size = 20;
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            synthesize(&params, 21, &mut rng),
            Err(KernelError::InvalidSize { .. })
        ));
    }

    #[test]
    fn mismatched_weight_length_is_rejected() {
        let mut params = base_params();
        params.kernel_prob.pop();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            synthesize(&params, 21, &mut rng),
            Err(KernelError::InvalidWeights(_))
        ));
    }

    #[test]
    fn fixed_seed_reproduces_kernel() {
        let params = base_params();
        let a = synthesize(&params, 21, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = synthesize(&params, 21, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
