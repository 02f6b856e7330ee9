//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte stream is not a recognized image container.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded image has no pixels.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Sample buffer length doesn't match the declared dimensions and mode.
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Requested resize target has a zero dimension.
    #[error("Invalid resize target: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Channel layout of a pixel buffer.
///
/// Serialized with the conventional short mode names (`L`, `LA`, `RGB`, `RGBA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "L")]
    Gray,
    #[serde(rename = "LA")]
    GrayAlpha,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBA")]
    Rgba,
}

impl ColorMode {
    /// Number of 8-bit samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::GrayAlpha => 2,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    /// Number of color (non-alpha) samples per pixel.
    pub fn color_channels(self) -> usize {
        match self {
            ColorMode::Gray | ColorMode::GrayAlpha => 1,
            ColorMode::Rgb | ColorMode::Rgba => 3,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, ColorMode::GrayAlpha | ColorMode::Rgba)
    }

    /// Short mode name, e.g. `"RGB"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Gray => "L",
            ColorMode::GrayAlpha => "LA",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded image: dimensions, color mode and row-major 8-bit samples.
///
/// Fields are private so a buffer can only exist with a sample count that
/// matches `width * height * mode.channels()`. Every stage takes it by
/// reference and produces new buffers instead of mutating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    mode: ColorMode,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer, checking the sample count against the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        mode: ColorMode,
        samples: Vec<u8>,
    ) -> Result<Self, DecodeError> {
        let expected = (width as usize) * (height as usize) * mode.channels();
        if samples.len() != expected {
            return Err(DecodeError::InvalidPixelData {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            mode,
            samples,
        })
    }

    /// Convert any decoded image into a buffer, reducing samples to 8 bits
    /// while keeping the gray/color and alpha structure.
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        use image::DynamicImage;

        let (mode, width, height, samples) = match img {
            DynamicImage::ImageLuma8(buf) => (ColorMode::Gray, buf.width(), buf.height(), buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => {
                (ColorMode::GrayAlpha, buf.width(), buf.height(), buf.into_raw())
            }
            DynamicImage::ImageRgb8(buf) => (ColorMode::Rgb, buf.width(), buf.height(), buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (ColorMode::Rgba, buf.width(), buf.height(), buf.into_raw()),
            other => {
                let color = other.color();
                match (color.has_color(), color.has_alpha()) {
                    (false, false) => {
                        let buf = other.into_luma8();
                        (ColorMode::Gray, buf.width(), buf.height(), buf.into_raw())
                    }
                    (false, true) => {
                        let buf = other.into_luma_alpha8();
                        (ColorMode::GrayAlpha, buf.width(), buf.height(), buf.into_raw())
                    }
                    (true, false) => {
                        let buf = other.into_rgb8();
                        (ColorMode::Rgb, buf.width(), buf.height(), buf.into_raw())
                    }
                    (true, true) => {
                        let buf = other.into_rgba8();
                        (ColorMode::Rgba, buf.width(), buf.height(), buf.into_raw())
                    }
                }
            }
        };

        Self {
            width,
            height,
            mode,
            samples,
        }
    }

    /// Convert to an image::DynamicImage for further processing.
    pub fn to_dynamic(&self) -> Option<image::DynamicImage> {
        use image::{DynamicImage, ImageBuffer};

        let (w, h, data) = (self.width, self.height, self.samples.clone());
        match self.mode {
            ColorMode::Gray => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            ColorMode::GrayAlpha => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageLumaA8),
            ColorMode::Rgb => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            ColorMode::Rgba => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
        }
    }

    /// Normalize to a 3-channel RGB buffer.
    ///
    /// Gray is replicated into all three channels and alpha is dropped
    /// without compositing.
    pub fn to_rgb(&self) -> Result<PixelBuffer, DecodeError> {
        if self.is_empty() {
            return Err(DecodeError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }

        let channels = self.mode.channels();
        let samples = match self.mode {
            ColorMode::Rgb => self.samples.clone(),
            ColorMode::Rgba => self
                .samples
                .chunks_exact(channels)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
            ColorMode::Gray | ColorMode::GrayAlpha => self
                .samples
                .chunks_exact(channels)
                .flat_map(|px| [px[0], px[0], px[0]])
                .collect(),
        };

        PixelBuffer::new(self.width, self.height, ColorMode::Rgb, samples)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` pair.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Row-major samples, `mode.channels()` bytes per pixel.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Mutable samples. The slice cannot change length, so the buffer stays
    /// consistent with its dimensions.
    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// Get the size of the sample buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.samples.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.samples.is_empty()
    }
}
