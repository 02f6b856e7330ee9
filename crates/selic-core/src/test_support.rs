//! Synthetic images shared by the unit tests.

use std::io::Cursor;

use image::ImageFormat;

use crate::decode::{ColorMode, PixelBuffer};
use crate::encode::encode_jpeg;

/// A single-color RGB image.
pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> PixelBuffer {
    let samples = color.repeat((width * height) as usize);
    PixelBuffer::new(width, height, ColorMode::Rgb, samples).unwrap()
}

/// An RGB image whose red channel ramps along x and green along y.
pub fn gradient_image(width: u32, height: u32) -> PixelBuffer {
    let mut samples = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            samples.push((x * 255 / width.max(1)) as u8);
            samples.push((y * 255 / height.max(1)) as u8);
            samples.push(128);
        }
    }
    PixelBuffer::new(width, height, ColorMode::Rgb, samples).unwrap()
}

/// Left half `left`, right half `right`.
pub fn two_tone_image(width: u32, height: u32, left: [u8; 3], right: [u8; 3]) -> PixelBuffer {
    let mut samples = Vec::with_capacity((width * height * 3) as usize);
    for _ in 0..height {
        for x in 0..width {
            let color = if x < width / 2 { left } else { right };
            samples.extend_from_slice(&color);
        }
    }
    PixelBuffer::new(width, height, ColorMode::Rgb, samples).unwrap()
}

/// High-contrast checkerboard with `cell`-pixel squares.
///
/// Light squares cycle through six pale tints and dark squares through two
/// dark grays, each at least 15 apart on some channel, so the image keeps
/// many dominant colors under the default tolerance and a gradient far
/// above the default complexity normalization.
pub fn checkerboard_image(width: u32, height: u32, cell: u32) -> PixelBuffer {
    const LIGHT: [[u8; 3]; 6] = [
        [235, 215, 195],
        [195, 235, 215],
        [215, 195, 235],
        [250, 230, 200],
        [200, 250, 230],
        [230, 200, 250],
    ];
    const DARK: [[u8; 3]; 2] = [[0, 0, 0], [20, 20, 20]];

    let mut samples = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let (cx, cy) = (x / cell, y / cell);
            let color = if (cx + cy) % 2 == 0 {
                LIGHT[((cx / 2 + cy) % 6) as usize]
            } else {
                DARK[(cy % 2) as usize]
            };
            samples.extend_from_slice(&color);
        }
    }
    PixelBuffer::new(width, height, ColorMode::Rgb, samples).unwrap()
}

/// Encode a buffer as PNG, keeping its color mode.
pub fn encode_png(buffer: &PixelBuffer) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    buffer
        .to_dynamic()
        .unwrap()
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Encode an RGB buffer as JPEG carrying an EXIF Orientation tag.
///
/// The APP1 segment holds a big-endian TIFF header and a single-entry IFD0.
pub fn jpeg_with_orientation(buffer: &PixelBuffer, orientation: u16) -> Vec<u8> {
    let jpeg = encode_jpeg(buffer, 90).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    // Tag 0x0112, type SHORT, count 1, value left-aligned in the offset field
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let payload_len = (2 + 6 + tiff.len()) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + payload_len as usize + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&payload_len.to_be_bytes());
    out.extend_from_slice(b"Exif\x00\x00");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}
