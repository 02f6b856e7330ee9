//! JPEG encoding.
//!
//! Uses the `jpeg-encoder` crate, which supports progressive scans and
//! optimized Huffman tables. Gray buffers are written as single-channel
//! JPEG; buffers with alpha are rejected because JPEG has no alpha channel.

use jpeg_encoder::{ColorType, Encoder};

use super::{check_dimensions, EncodeError};
use crate::decode::{ColorMode, PixelBuffer};
use crate::planner::OutputFormat;

/// Largest width or height a JPEG frame header can store.
const MAX_SIDE: u32 = u16::MAX as u32;

/// Encode a buffer as progressive JPEG.
///
/// # Arguments
///
/// * `buffer` - Gray or RGB buffer
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Example
///
/// ```
/// use selic_core::decode::{ColorMode, PixelBuffer};
/// use selic_core::encode::encode_jpeg;
///
/// let rgb = PixelBuffer::new(100, 100, ColorMode::Rgb, vec![128u8; 100 * 100 * 3]).unwrap();
/// let jpeg = encode_jpeg(&rgb, 90).unwrap();
///
/// // Verify JPEG magic bytes
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(buffer, OutputFormat::Jpeg, MAX_SIDE)?;

    let color_type = match buffer.mode() {
        ColorMode::Gray => ColorType::Luma,
        ColorMode::Rgb => ColorType::Rgb,
        mode @ (ColorMode::GrayAlpha | ColorMode::Rgba) => {
            return Err(EncodeError::UnsupportedColorMode {
                format: OutputFormat::Jpeg,
                mode,
            })
        }
    };

    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out, quality.clamp(1, 100));
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);

    // Both sides were checked against u16::MAX above
    encoder
        .encode(
            buffer.samples(),
            buffer.width() as u16,
            buffer.height() as u16,
            color_type,
        )
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Jpeg,
            reason: e.to_string(),
        })?;

    Ok(out)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Property: any RGB buffer in the planned quality range encodes to a
        /// well-formed JPEG.
        #[test]
        fn prop_jpeg_markers(
            width in 1u32..=48,
            height in 1u32..=48,
            quality in 70u8..=95,
            seed in any::<u8>(),
        ) {
            let samples: Vec<u8> = (0..width * height * 3)
                .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
                .collect();
            let buffer = PixelBuffer::new(width, height, ColorMode::Rgb, samples).unwrap();

            let jpeg = encode_jpeg(&buffer, quality).unwrap();
            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
        }
    }
}
