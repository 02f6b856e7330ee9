//! Lossy encoding of preprocessed buffers.
//!
//! This module provides functionality for:
//! - Progressive JPEG encoding with optimized Huffman tables
//! - Lossy WebP encoding at maximum compression effort
//!
//! # Architecture
//!
//! The container and quality come from [`CompressionSettings`]; the quality
//! is passed to the codec verbatim. Codec rejections surface as
//! [`EncodeError`] and are never retried with another format.
//!
//! # Examples
//!
//! ```ignore
//! use selic_core::encode::encode;
//!
//! let bytes = encode(&buffer, &settings).unwrap();
//! println!("Encoded {} bytes as {}", bytes.len(), settings.format);
//! ```

mod jpeg;
mod webp;

use thiserror::Error;

use crate::decode::{ColorMode, PixelBuffer};
use crate::planner::{CompressionSettings, OutputFormat};

pub use self::jpeg::encode_jpeg;
pub use self::webp::encode_webp;

/// Errors that can occur during encoding.
#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    /// Width or height is zero or above the container limit
    #[error("Invalid dimensions for {format}: {width}x{height}")]
    InvalidDimensions {
        format: OutputFormat,
        width: u32,
        height: u32,
    },

    /// The container cannot store this color mode
    #[error("{format} cannot encode {mode} images")]
    UnsupportedColorMode { format: OutputFormat, mode: ColorMode },

    /// The codec rejected the input
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed { format: OutputFormat, reason: String },

    /// The codec reported success but produced no bytes
    #[error("{0} encoder produced no output")]
    EmptyOutput(OutputFormat),
}

/// Encode a buffer with the planned format and quality.
pub fn encode(buffer: &PixelBuffer, settings: &CompressionSettings) -> Result<Vec<u8>, EncodeError> {
    let quality = settings.quality.get();
    let bytes = match settings.format {
        OutputFormat::Jpeg => encode_jpeg(buffer, quality)?,
        OutputFormat::Webp => encode_webp(buffer, quality)?,
    };

    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput(settings.format));
    }
    Ok(bytes)
}

/// Reject empty buffers and dimensions above `max_side`.
fn check_dimensions(
    buffer: &PixelBuffer,
    format: OutputFormat,
    max_side: u32,
) -> Result<(), EncodeError> {
    let (width, height) = buffer.dimensions();
    if buffer.is_empty() || width > max_side || height > max_side {
        return Err(EncodeError::InvalidDimensions {
            format,
            width,
            height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{BitAllocation, OptimizationLevel, Quality};
    use crate::test_support::gradient_image;

    fn settings(format: OutputFormat) -> CompressionSettings {
        CompressionSettings {
            quality: Quality::from_fraction(0.85),
            format,
            optimization_level: OptimizationLevel::Standard,
            bit_allocation: BitAllocation {
                high: 1.0,
                mid: 1.0,
                low: 1.0,
                semantic: 1.4,
            },
            priority_regions: Vec::new(),
        }
    }

    #[test]
    fn test_dispatch_jpeg() {
        let bytes = encode(&gradient_image(32, 32), &settings(OutputFormat::Jpeg)).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_dispatch_webp() {
        let bytes = encode(&gradient_image(32, 32), &settings(OutputFormat::Webp)).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_deterministic_output() {
        let img = gradient_image(48, 40);
        for format in [OutputFormat::Jpeg, OutputFormat::Webp] {
            let a = encode(&img, &settings(format)).unwrap();
            let b = encode(&img, &settings(format)).unwrap();
            assert_eq!(a, b, "{format} output differs between runs");
        }
    }

    #[test]
    fn test_error_messages() {
        let err = EncodeError::UnsupportedColorMode {
            format: OutputFormat::Jpeg,
            mode: ColorMode::Rgba,
        };
        assert_eq!(err.to_string(), "JPEG cannot encode RGBA images");
    }
}
