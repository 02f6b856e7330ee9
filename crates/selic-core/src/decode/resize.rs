//! Image resizing for the fixed-resolution analysis pass.
//!
//! All functions return new `PixelBuffer` instances without modifying the input.

use image::imageops::FilterType;

use super::{DecodeError, PixelBuffer};

/// Resize an image to exact dimensions with Lanczos3, ignoring aspect ratio.
///
/// The color mode of the source is preserved.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` for a zero target dimension and
/// `DecodeError::EmptyImage` for an empty source.
pub fn resize(
    image: &PixelBuffer,
    width: u32,
    height: u32,
) -> Result<PixelBuffer, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    if image.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }

    // Fast path: if dimensions match, just clone
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let dynamic = image
        .to_dynamic()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create image buffer".to_string()))?;

    let resized = dynamic.resize_exact(width, height, FilterType::Lanczos3);

    Ok(PixelBuffer::from_dynamic(resized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::ColorMode;
    use crate::test_support::gradient_image;

    #[test]
    fn test_resize_basic() {
        let img = gradient_image(100, 50);
        let resized = resize(&img, 50, 25).unwrap();

        assert_eq!(resized.dimensions(), (50, 25));
        assert_eq!(resized.samples().len(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_same_dimensions_is_identity() {
        let img = gradient_image(100, 50);
        let resized = resize(&img, 100, 50).unwrap();

        assert_eq!(resized, img);
    }

    #[test]
    fn test_resize_upscale() {
        let img = gradient_image(50, 25);
        let resized = resize(&img, 224, 224).unwrap();

        assert_eq!(resized.dimensions(), (224, 224));
    }

    #[test]
    fn test_resize_preserves_mode() {
        let img = PixelBuffer::new(4, 4, ColorMode::GrayAlpha, vec![100u8; 4 * 4 * 2]).unwrap();
        let resized = resize(&img, 8, 2).unwrap();

        assert_eq!(resized.mode(), ColorMode::GrayAlpha);
        assert_eq!(resized.samples().len(), 8 * 2 * 2);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = gradient_image(100, 50);

        assert!(matches!(
            resize(&img, 0, 50),
            Err(DecodeError::InvalidDimensions { .. })
        ));
        assert!(resize(&img, 50, 0).is_err());
    }

    #[test]
    fn test_resize_empty_source_error() {
        let img = PixelBuffer::new(0, 0, ColorMode::Rgb, vec![]).unwrap();
        assert!(matches!(
            resize(&img, 10, 10),
            Err(DecodeError::EmptyImage { .. })
        ));
    }
}
