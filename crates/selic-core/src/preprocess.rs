//! Adaptive preprocessing ahead of encoding.

use crate::adjustments::{adjust_contrast, sharpen};
use crate::config::PreprocessConfig;
use crate::decode::PixelBuffer;
use crate::planner::{CompressionSettings, OptimizationLevel};

/// Prepare a buffer for encoding.
///
/// With [`OptimizationLevel::High`] the image is sharpened, then its contrast
/// is raised, using the configured factors. Any other level returns an
/// unchanged copy. The input buffer is never modified.
pub fn preprocess(
    buffer: &PixelBuffer,
    settings: &CompressionSettings,
    config: &PreprocessConfig,
) -> PixelBuffer {
    match settings.optimization_level {
        OptimizationLevel::Standard => buffer.clone(),
        OptimizationLevel::High => {
            let sharpened = sharpen(buffer, config.sharpness);
            adjust_contrast(&sharpened, config.contrast)
        }
    }
}
