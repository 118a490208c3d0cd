//! 2D correlation of the float raster with a profile's blur kernel.
//!
//! Borders use reflect-101 indexing (`dcb | abcd | cba`), so edge pixels
//! see a mirrored neighborhood instead of a dark halo. The kernels are
//! symmetric for every family except rotated anisotropic ones, where
//! correlation (no kernel flip) is the semantics the rest of the pipeline
//! expects.

use degrade_kernels::Kernel;

use super::ImageBuf;

/// Filter `img` with `kernel`, returning a new raster of the same size.
pub fn convolve(img: &ImageBuf, kernel: &Kernel) -> ImageBuf {
    let (w, h) = (img.w as usize, img.h as usize);
    let k = kernel.size;
    let half = (k / 2) as isize;

    let mut out = vec![0.0f32; img.data.len()];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for ky in 0..k {
                let sy = reflect_101(y as isize + ky as isize - half, h);
                for kx in 0..k {
                    let sx = reflect_101(x as isize + kx as isize - half, w);
                    let tap = kernel.at(kx, ky);
                    let src = (sy * w + sx) * 3;
                    acc[0] += tap * img.data[src];
                    acc[1] += tap * img.data[src + 1];
                    acc[2] += tap * img.data[src + 2];
                }
            }
            let dst = (y * w + x) * 3;
            out[dst..dst + 3].copy_from_slice(&acc);
        }
    }

    ImageBuf {
        w: img.w,
        h: img.h,
        data: out,
    }
}

/// Reflect an index into `[0, len)` without repeating the edge sample.
#[inline]
fn reflect_101(mut i: isize, len: usize) -> usize {
    let n = len as isize;
    debug_assert!(n > 0);
    if n == 1 {
        return 0;
    }
    // Period of the reflected sequence is 2(n-1); loop handles kernels
    // wider than the image.
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_kernel(size: usize) -> Kernel {
        let mut data = vec![0.0f32; size * size];
        data[(size / 2) * size + size / 2] = 1.0;
        Kernel { size, data }
    }

    fn box_kernel(size: usize) -> Kernel {
        let tap = 1.0 / (size * size) as f32;
        Kernel {
            size,
            data: vec![tap; size * size],
        }
    }

    #[test]
    fn identity_kernel_is_a_no_op() {
        let img = ImageBuf::from_raw(
            3,
            2,
            (0..18).map(|i| i as f32 / 18.0).collect(),
        );
        let out = convolve(&img, &identity_kernel(5));
        for (a, b) in img.data.iter().zip(&out.data) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn box_kernel_preserves_flat_image() {
        let img = ImageBuf::from_raw(8, 8, vec![0.25; 8 * 8 * 3]);
        let out = convolve(&img, &box_kernel(7));
        assert_eq!(out.w, 8);
        assert_eq!(out.h, 8);
        for &v in &out.data {
            assert!((v - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn blur_smooths_an_impulse() {
        let mut data = vec![0.0f32; 5 * 5 * 3];
        let center = (2 * 5 + 2) * 3;
        data[center] = 1.0;
        let img = ImageBuf::from_raw(5, 5, data);
        let out = convolve(&img, &box_kernel(3));
        // Impulse energy spreads over the 3x3 neighborhood.
        assert!((out.data[center] - 1.0 / 9.0).abs() < 1e-6);
        assert!((out.data[(1 * 5 + 1) * 3] - 1.0 / 9.0).abs() < 1e-6);
        assert_eq!(out.data[(0 * 5 + 0) * 3], 0.0);
    }

    #[test]
    fn reflect_101_indexing() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(0, 5), 0);
        assert_eq!(reflect_101(4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 1), 0);
    }
}
