//! Image decoding for the compression pipeline.
//!
//! This module provides functionality for:
//! - Decoding uploaded bytes (JPEG, PNG, WebP, GIF, BMP, TIFF) into a [`PixelBuffer`]
//! - Applying EXIF orientation so the buffer matches how the photo is displayed
//! - Resizing buffers for the fixed-resolution analysis pass
//!
//! # Architecture
//!
//! Decoding is synchronous and keeps no state between calls. The native color
//! mode of the upload (L, LA, RGB, RGBA) survives decoding; stages that need
//! three channels call [`PixelBuffer::to_rgb`] themselves.
//!
//! # Examples
//!
//! ```ignore
//! use selic_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let decoded = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} {}", decoded.pixels.width(), decoded.pixels.height(), decoded.format);
//! ```

mod container;
mod resize;
mod types;

pub use container::{decode_image, DecodedImage};
pub use resize::resize;
pub use types::{ColorMode, DecodeError, Orientation, PixelBuffer};
