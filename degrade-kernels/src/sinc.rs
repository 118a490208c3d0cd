// SPDX-License-Identifier: MIT
//! Circular low-pass ("sinc") kernel synthesis.
//!
//! An ideal 2D low-pass filter with cutoff angular frequency `omega_c` has
//! the radial impulse response `omega_c * J1(omega_c * r) / (2*pi*r)` with
//! the removable singularity `omega_c^2 / (4*pi)` at the center. Sampling
//! it on an odd square grid and normalizing to unit sum gives a kernel that
//! reproduces the ringing artifacts of ideal low-pass filtering.

use std::f64::consts::PI;

use crate::Kernel;

/// Sample a circular low-pass kernel of odd side `kernel_size` at cutoff
/// angular frequency `omega_c` (radians, in `(0, pi]`), normalized to unit
/// sum.
pub fn circular_lowpass_kernel(omega_c: f64, kernel_size: usize) -> Kernel {
    debug_assert!(kernel_size % 2 == 1, "kernel side must be odd");

    let center = (kernel_size - 1) as f64 / 2.0;
    let mut data = vec![0.0f32; kernel_size * kernel_size];

    let mut sum = 0.0f64;
    for y in 0..kernel_size {
        for x in 0..kernel_size {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let r = (dx * dx + dy * dy).sqrt();
            let v = if r == 0.0 {
                omega_c * omega_c / (4.0 * PI)
            } else {
                omega_c * bessel_j1(omega_c * r) / (2.0 * PI * r)
            };
            data[y * kernel_size + x] = v as f32;
            sum += v;
        }
    }

    let inv = (1.0 / sum) as f32;
    for v in &mut data {
        *v *= inv;
    }

    Kernel {
        size: kernel_size,
        data,
    }
}

/// Bessel function of the first kind, order one.
///
/// Rational polynomial approximation (two regimes split at |x| = 8),
/// accurate to better than 1e-8 over the range used here. The cutoff grid
/// arguments never exceed `pi * kernel_size`, well within the asymptotic
/// regime's validity.
pub fn bessel_j1(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let p1 = x
            * (72_362_614_232.0
                + y * (-7_895_059_235.0
                    + y * (242_396_853.1
                        + y * (-2_972_611.439 + y * (15_704.482_60 + y * -30.160_366_06)))));
        let p2 = 144_725_228_442.0
            + y * (2_300_535_178.0
                + y * (18_583_304.74 + y * (99_447.433_94 + y * (376.999_139_7 + y))));
        p1 / p2
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 2.356_194_491;
        let p1 = 1.0
            + y * (0.183_105e-2
                + y * (-0.351_639_649_6e-4 + y * (0.245_752_017_4e-5 + y * -0.240_337_019e-6)));
        let p2 = 0.046_874_999_95
            + y * (-0.200_269_087_3e-3
                + y * (0.844_919_909_6e-5 + y * (-0.882_289_87e-6 + y * 0.105_787_412e-6)));
        let ans = (2.0 / (PI * ax)).sqrt() * (xx.cos() * p1 - z * xx.sin() * p2);
        if x < 0.0 { -ans } else { ans }
    }
}
