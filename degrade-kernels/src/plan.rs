// SPDX-License-Identifier: MIT
//! # Resolution Planning
//!
//! Computes the intermediate resolution used by the first degradation stage.
//! The second-order degradation recipe resizes twice: first to a resolution
//! halfway between "no downscale" and "full downscale", then to the final
//! low resolution. This module owns that halfway computation.
//!
//! The intermediate resolution preserves the *high-resolution* aspect ratio
//! exactly (the low-resolution target may have a slightly different ratio
//! after integer rounding; the HR ratio is the authoritative one here).

use serde::Deserialize;

/// A (height, width) pair in pixels. Height first, matching the
/// configuration document's `[h, w]` ordering (it deserializes from a
/// two-element sequence, not a map).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "(u32, u32)")]
pub struct Resolution {
    pub h: u32,
    pub w: u32,
}

impl Resolution {
    pub fn new(h: u32, w: u32) -> Self {
        Self { h, w }
    }
}

impl From<(u32, u32)> for Resolution {
    fn from((h, w): (u32, u32)) -> Self {
        Self { h, w }
    }
}

/// Compute the first-stage target resolution between `lr` and `hr`.
///
/// The scale factor is the midpoint `(h_lr/h_hr + 1) / 2`, i.e. halfway
/// between keeping the HR size and going straight to the LR height. Width
/// is derived from the intermediate height so the HR aspect ratio is kept.
///
/// # Examples
///
/// ```
/// use degrade_kernels::plan::{intermediate_resolution, Resolution};
///
/// let hr = Resolution::new(1080, 1920);
/// let lr = Resolution::new(270, 480);
/// assert_eq!(intermediate_resolution(lr, hr), Resolution::new(675, 1200));
/// ```
pub fn intermediate_resolution(lr: Resolution, hr: Resolution) -> Resolution {
    let (h_hr, w_hr) = (hr.h as f64, hr.w as f64);
    let scale = (lr.h as f64 / h_hr + 1.0) / 2.0;

    let h = (h_hr * scale).round().max(1.0);
    let w = (h * w_hr / h_hr).round().max(1.0);

    Resolution {
        h: h as u32,
        w: w as u32,
    }
}
