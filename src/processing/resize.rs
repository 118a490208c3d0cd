//! Stochastic resampling of the float raster.
//!
//! The method for each call is drawn uniformly from the profile's
//! configured candidate list; only bilinear and area interpolation exist
//! (the configuration layer rejects anything else before a run starts).
//! Resampling runs on fast_image_resize's F32x3 path, with the raster's
//! `Vec<f32>` reinterpreted as bytes for the typed views.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::F32x3;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use rand::Rng;

use degrade_kernels::Resolution;

use crate::config::ResizeMethod;
use crate::error::Result;

use super::ImageBuf;

impl ResizeMethod {
    fn algorithm(self) -> ResizeAlg {
        match self {
            // Box convolution averages the source footprint on downscale,
            // i.e. area interpolation.
            ResizeMethod::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResizeMethod::Area => ResizeAlg::Convolution(FilterType::Box),
        }
    }
}

/// Resize `img` to `target` with a method drawn uniformly from `methods`.
pub fn resize<R: Rng + ?Sized>(
    img: &ImageBuf,
    target: Resolution,
    methods: &[ResizeMethod],
    rng: &mut R,
) -> Result<ImageBuf> {
    let method = methods[rng.gen_range(0..methods.len())];
    resize_with(img, target, method)
}

/// Resize `img` to `target` with an explicit method.
pub fn resize_with(img: &ImageBuf, target: Resolution, method: ResizeMethod) -> Result<ImageBuf> {
    if target.h == img.h && target.w == img.w {
        return Ok(img.clone());
    }

    let src_view =
        TypedImageRef::<F32x3>::from_buffer(img.w, img.h, bytemuck::cast_slice(&img.data))?;

    let mut out = vec![0.0f32; (target.w * target.h * 3) as usize];
    let mut dst_view =
        TypedImage::<F32x3>::from_buffer(target.w, target.h, bytemuck::cast_slice_mut(&mut out))?;

    let opts = ResizeOptions::new()
        .resize_alg(method.algorithm())
        .use_alpha(false);
    Resizer::new().resize_typed::<F32x3>(&src_view, &mut dst_view, &opts)?;

    Ok(ImageBuf {
        w: target.w,
        h: target.h,
        data: out,
    })
}
