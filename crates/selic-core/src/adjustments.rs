//! Enhancement operators used by preprocessing.
//!
//! Both operators interpolate between the image and a degenerate version of
//! it: `out = degenerate + factor * (orig - degenerate)`. A factor of 1.0 is
//! the identity, above 1.0 enhances, below 1.0 attenuates.
//!
//! ## Operators
//! 1. Sharpness: the degenerate image is a 3×3 smoothing of the original
//! 2. Contrast: the degenerate image is a flat gray at the mean luma
//!
//! Only color channels change; alpha is copied as is.

use crate::decode::{ColorMode, PixelBuffer};
use crate::luminance::rec601_luma;

/// Smoothing kernel weights, row-major. The center carries 5 of 13.
const SMOOTH_KERNEL: [u32; 9] = [1, 1, 1, 1, 5, 1, 1, 1, 1];
const SMOOTH_KERNEL_SUM: u32 = 13;

/// Sharpen an image.
///
/// Border pixels are not filtered and keep their original values.
///
/// # Example
/// ```
/// use selic_core::adjustments::sharpen;
/// use selic_core::decode::{ColorMode, PixelBuffer};
///
/// let flat = PixelBuffer::new(3, 3, ColorMode::Gray, vec![100; 9]).unwrap();
/// assert_eq!(sharpen(&flat, 1.1), flat);
/// ```
pub fn sharpen(buffer: &PixelBuffer, factor: f32) -> PixelBuffer {
    let mut out = buffer.clone();
    if factor == 1.0 {
        return out;
    }

    let (width, height) = (buffer.width() as usize, buffer.height() as usize);
    if width < 3 || height < 3 {
        return out;
    }

    let channels = buffer.mode().channels();
    let color_channels = buffer.mode().color_channels();
    let src = buffer.samples();
    let dst = out.samples_mut();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            for c in 0..color_channels {
                let smooth = smoothed_sample(src, width, channels, x, y, c);
                let idx = (y * width + x) * channels + c;
                dst[idx] = blend(smooth, src[idx] as f32, factor);
            }
        }
    }

    out
}

/// Stretch or compress color values around the mean luma.
///
/// The mean is the rounded average ITU-R BT.601 luma of the whole image (the
/// gray value itself for gray images).
pub fn adjust_contrast(buffer: &PixelBuffer, factor: f32) -> PixelBuffer {
    let mut out = buffer.clone();
    if factor == 1.0 || buffer.is_empty() {
        return out;
    }

    let mean = mean_luma(buffer) as f32;
    let channels = buffer.mode().channels();
    let color_channels = buffer.mode().color_channels();

    for px in out.samples_mut().chunks_exact_mut(channels) {
        for value in &mut px[..color_channels] {
            *value = blend(mean, *value as f32, factor);
        }
    }

    out
}

/// Rounded mean luma of a buffer.
pub fn mean_luma(buffer: &PixelBuffer) -> u8 {
    let channels = buffer.mode().channels();
    let pixels = buffer.samples().chunks_exact(channels);
    let count = pixels.len() as u64;
    if count == 0 {
        return 0;
    }

    let sum: u64 = match buffer.mode() {
        ColorMode::Gray | ColorMode::GrayAlpha => pixels.map(|px| px[0] as u64).sum(),
        ColorMode::Rgb | ColorMode::Rgba => pixels
            .map(|px| rec601_luma(px[0], px[1], px[2]) as u64)
            .sum(),
    };

    ((sum + count / 2) / count) as u8
}

/// Weighted 3×3 average around an interior pixel.
#[inline]
fn smoothed_sample(
    src: &[u8],
    width: usize,
    channels: usize,
    x: usize,
    y: usize,
    c: usize,
) -> f32 {
    let mut acc = 0u32;
    for (k, weight) in SMOOTH_KERNEL.iter().enumerate() {
        let sx = x + k % 3 - 1;
        let sy = y + k / 3 - 1;
        acc += weight * src[(sy * width + sx) * channels + c] as u32;
    }
    acc as f32 / SMOOTH_KERNEL_SUM as f32
}

/// `degenerate + factor * (orig - degenerate)`, rounded and clamped to 0–255.
#[inline]
fn blend(degenerate: f32, orig: f32, factor: f32) -> u8 {
    (degenerate + factor * (orig - degenerate)).round().clamp(0.0, 255.0) as u8
}


// ============================================================================
// Property-Based Tests
// ============================================================================
