//! Lossy WebP encoding through libwebp.

use super::{check_dimensions, EncodeError};
use crate::decode::{ColorMode, PixelBuffer};
use crate::planner::OutputFormat;

/// Largest width or height libwebp accepts.
const MAX_SIDE: u32 = 16383;
/// Slowest, smallest-output compression method.
const METHOD: i32 = 6;

/// Encode a buffer as lossy WebP at maximum effort.
///
/// Gray buffers are expanded to RGB and gray+alpha to RGBA first. Encoding
/// runs single-threaded so output bytes are reproducible.
pub fn encode_webp(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(buffer, OutputFormat::Webp, MAX_SIDE)?;

    let (data, has_alpha) = expand_to_color(buffer);
    let (width, height) = buffer.dimensions();
    let encoder = if has_alpha {
        webp::Encoder::from_rgba(&data, width, height)
    } else {
        webp::Encoder::from_rgb(&data, width, height)
    };

    let mut config = webp::WebPConfig::new().map_err(|_| EncodeError::EncodingFailed {
        format: OutputFormat::Webp,
        reason: "failed to create WebP config".to_string(),
    })?;
    config.lossless = 0;
    config.quality = quality.min(100) as f32;
    config.method = METHOD;
    config.autofilter = 1;
    config.thread_level = 0;

    let output = encoder
        .encode_advanced(&config)
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Webp,
            reason: format!("{:?}", e),
        })?;

    Ok(output.to_vec())
}

/// Samples libwebp can take directly: RGB or RGBA.
fn expand_to_color(buffer: &PixelBuffer) -> (Vec<u8>, bool) {
    let samples = buffer.samples();
    match buffer.mode() {
        ColorMode::Rgb => (samples.to_vec(), false),
        ColorMode::Rgba => (samples.to_vec(), true),
        ColorMode::Gray => (samples.iter().flat_map(|&v| [v, v, v]).collect(), false),
        ColorMode::GrayAlpha => (
            samples
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0], px[1]])
                .collect(),
            true,
        ),
    }
}
