//! Container decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, Orientation, PixelBuffer};

/// An uploaded image after decoding.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Pixels with EXIF orientation already applied.
    pub pixels: PixelBuffer,
    /// Container name as detected from the magic bytes (e.g. `"PNG"`).
    pub format: String,
    /// Orientation tag that was applied.
    pub orientation: Orientation,
}

/// Decode an image from raw upload bytes, applying EXIF orientation correction.
///
/// The container is detected from the magic bytes, never from a file name or
/// declared content type.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not a recognized image.
/// Returns `DecodeError::CorruptedFile` if the container is recognized but cannot be decoded.
/// Returns `DecodeError::EmptyImage` if the decoded image has no pixels.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;

    let img = reader.decode().map_err(|e| match e {
        image::ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let orientation = extract_orientation(bytes);
    let pixels = PixelBuffer::from_dynamic(apply_orientation(img, orientation));

    if pixels.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: pixels.width(),
            height: pixels.height(),
        });
    }

    Ok(DecodedImage {
        pixels,
        format: format!("{format:?}").to_ascii_uppercase(),
        orientation,
    })
}

/// Extract EXIF orientation from container bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
