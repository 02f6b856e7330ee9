//! Pixel statistics: brightness, edge complexity and dominant colors.
//!
//! Statistics are measured on a fixed-size analysis image (224×224 by
//! default) produced with a Lanczos3 resample of the RGB-normalized upload.
//! This keeps the cost independent of the upload resolution; fine detail lost
//! in the downscale does not contribute to complexity.
//!
//! - **Brightness**: mean of the per-pixel channel average, divided by 255.
//! - **Complexity**: mean magnitude of the luminance gradient (central
//!   differences inside, one-sided differences on the borders), divided by
//!   `complexity_normalization` and clamped to `[0, 1]`. An edge-density
//!   proxy, not a perceptual metric.
//! - **Dominant colors**: color counts with near-duplicates (within
//!   `color_tolerance` on every channel) merged into the more frequent color,
//!   most frequent first. Resampling halos around a hard edge would otherwise
//!   count as extra colors.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::decode::{self, DecodeError, PixelBuffer};
use crate::histogram::{compute_color_histogram, Rgb};
use crate::luminance::channel_mean;

/// Upper bound for `analysis.dominant_colors`.
pub const MAX_DOMINANT_COLORS: usize = 5;

/// Statistics of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStatistics {
    /// Mean brightness (0.0 to 1.0).
    pub brightness: f32,
    /// Normalized edge density (0.0 to 1.0).
    pub complexity: f32,
    /// Up to `analysis.dominant_colors` colors, most frequent first.
    pub dominant_colors: Vec<Rgb>,
}

/// Produce the RGB analysis image for a buffer.
///
/// # Errors
///
/// Returns a `DecodeError` if the buffer is empty or cannot be resampled.
pub fn analysis_image(
    buffer: &PixelBuffer,
    config: &AnalysisConfig,
) -> Result<PixelBuffer, DecodeError> {
    let rgb = buffer.to_rgb()?;
    decode::resize(&rgb, config.size, config.size)
}

/// Measure the statistics of an already prepared RGB analysis image.
pub fn measure(analysis: &PixelBuffer, config: &AnalysisConfig) -> ImageStatistics {
    let (width, height) = analysis.dimensions();
    let gray: Vec<f32> = analysis
        .samples()
        .chunks_exact(3)
        .map(|px| channel_mean(px[0], px[1], px[2]))
        .collect();

    let brightness = mean_brightness(&gray);
    let complexity = (mean_gradient_magnitude(&gray, width as usize, height as usize)
        / config.complexity_normalization)
        .clamp(0.0, 1.0);
    let dominant_colors = compute_color_histogram(analysis.samples())
        .dominant_colors(config.dominant_colors, config.color_tolerance);

    ImageStatistics {
        brightness,
        complexity,
        dominant_colors,
    }
}

/// Compute the statistics of any decoded buffer.
///
/// # Example
/// ```
/// use selic_core::config::AnalysisConfig;
/// use selic_core::decode::{ColorMode, PixelBuffer};
/// use selic_core::statistics::compute;
///
/// let white = PixelBuffer::new(4, 4, ColorMode::Rgb, vec![255; 48]).unwrap();
/// let stats = compute(&white, &AnalysisConfig::default()).unwrap();
/// assert_eq!(stats.brightness, 1.0);
/// ```
pub fn compute(buffer: &PixelBuffer, config: &AnalysisConfig) -> Result<ImageStatistics, DecodeError> {
    let analysis = analysis_image(buffer, config)?;
    Ok(measure(&analysis, config))
}

fn mean_brightness(gray: &[f32]) -> f32 {
    if gray.is_empty() {
        return 0.0;
    }
    let sum: f64 = gray.iter().map(|&v| v as f64).sum();
    ((sum / gray.len() as f64) / 255.0).clamp(0.0, 1.0) as f32
}

/// Mean of `sqrt(dx² + dy²)` over a row-major gray plane.
fn mean_gradient_magnitude(gray: &[f32], width: usize, height: usize) -> f32 {
    if gray.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0f64;
    for y in 0..height {
        let row = &gray[y * width..(y + 1) * width];
        for x in 0..width {
            let dx = axis_gradient(x, width, |i| row[i]);
            let dy = axis_gradient(y, height, |i| gray[i * width + x]);
            sum += ((dx * dx + dy * dy) as f64).sqrt();
        }
    }

    (sum / gray.len() as f64) as f32
}

/// Finite difference at `i` along an axis of length `len`.
///
/// Central difference inside, one-sided difference at both ends, zero for a
/// single-sample axis.
#[inline]
fn axis_gradient(i: usize, len: usize, at: impl Fn(usize) -> f32) -> f32 {
    if len < 2 {
        0.0
    } else if i == 0 {
        at(1) - at(0)
    } else if i == len - 1 {
        at(len - 1) - at(len - 2)
    } else {
        (at(i + 1) - at(i - 1)) / 2.0
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
