//! Luminance helpers shared by analysis and preprocessing.
//!
//! Two different definitions are in use and must not be mixed:
//! - the unweighted channel average, which drives brightness and edge
//!   statistics;
//! - ITU-R BT.601 luma, which is the gray reference of the contrast
//!   enhancement.

/// ITU-R BT.601 red weight in 16.16 fixed point.
const LUMA_R: u32 = 19595;
/// ITU-R BT.601 green weight in 16.16 fixed point.
const LUMA_G: u32 = 38470;
/// ITU-R BT.601 blue weight in 16.16 fixed point.
const LUMA_B: u32 = 7471;

/// Unweighted mean of the three channels (0.0 to 255.0).
#[inline]
pub fn channel_mean(r: u8, g: u8, b: u8) -> f32 {
    (r as f32 + g as f32 + b as f32) / 3.0
}

/// ITU-R BT.601 luma of an 8-bit RGB triple, rounded to the nearest integer.
#[inline]
pub fn rec601_luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32;
    ((weighted + 0x8000) >> 16) as u8
}
