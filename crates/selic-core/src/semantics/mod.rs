//! Semantic classification of analyzed images.
//!
//! A [`SemanticModel`] turns [`ImageStatistics`] into a short description, a
//! confidence and an estimated encoding quality. Two implementations exist:
//!
//! - [`RuleBasedClassifier`]: a deterministic rule table (the default)
//! - [`ModelBackedClassifier`]: delegates the description to a caller-supplied
//!   [`CaptionModel`]
//!
//! Which one a processor uses is decided by [`SemanticConfig::model`] when the
//! processor is built.

mod learned;
mod rules;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SemanticConfig, SemanticModelKind};
use crate::decode::PixelBuffer;
use crate::statistics::ImageStatistics;

pub use learned::{CaptionModel, ModelBackedClassifier, ModelCaption};
pub use rules::RuleBasedClassifier;

/// Base quality before any adjustment.
const BASE_QUALITY: f32 = 0.85;
/// Lower bound of the estimated quality.
pub const MIN_ESTIMATED_QUALITY: f32 = 0.70;
/// Upper bound of the estimated quality.
pub const MAX_ESTIMATED_QUALITY: f32 = 0.95;
/// Images above this many pixels are encoded slightly lower.
const HIGH_RES_PIXELS: u64 = 4_000_000;

/// Errors raised while classifying an already decoded image.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// The semantic model reported a confidence outside (0, 1]
    #[error("semantic model reported confidence {0}, expected a value in (0, 1]")]
    InvalidConfidence(f32),

    /// The semantic model produced no description
    #[error("semantic model returned an empty description")]
    EmptyDescription,

    /// The captioning backend failed
    #[error("caption model failed: {0}")]
    ModelFailed(String),
}

/// Output of semantic classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticResult {
    /// Human-readable description, e.g. "A bright simple square neutral-toned image"
    pub description: String,
    /// Confidence in (0, 1]
    pub confidence: f32,
    /// Suggested encoding quality in [0.70, 0.95]
    pub estimated_quality: f32,
}

/// A swappable image classifier.
pub trait SemanticModel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Classify an image.
    ///
    /// # Arguments
    /// * `dimensions` - Width and height of the decoded upload
    /// * `stats` - Statistics measured on the analysis image
    /// * `analysis` - The RGB analysis image the statistics came from
    fn classify(
        &self,
        dimensions: (u32, u32),
        stats: &ImageStatistics,
        analysis: &PixelBuffer,
    ) -> Result<SemanticResult, AnalysisError>;
}

/// Build the semantic model selected by configuration.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCaptionModel`] when the learned model is
/// selected without a caption model.
pub fn build_semantic_model(
    config: &SemanticConfig,
    caption_model: Option<Arc<dyn CaptionModel>>,
) -> Result<Box<dyn SemanticModel>, ConfigError> {
    match config.model {
        SemanticModelKind::RuleBased => {
            if caption_model.is_some() {
                log::debug!("caption model supplied but semantics.model is rule-based; ignoring it");
            }
            Ok(Box::new(RuleBasedClassifier::new(config.confidence)))
        }
        SemanticModelKind::Learned => caption_model
            .map(|model| Box::new(ModelBackedClassifier::new(model)) as Box<dyn SemanticModel>)
            .ok_or(ConfigError::MissingCaptionModel),
    }
}

/// Estimated encoding quality shared by every semantic model.
///
/// Starts at 0.85, adds 0.10 for highly detailed images and 0.05 for dark
/// ones, removes 0.05 above four megapixels, then clamps to [0.70, 0.95].
pub fn estimate_quality(stats: &ImageStatistics, dimensions: (u32, u32)) -> f32 {
    let mut quality = BASE_QUALITY;

    if ComplexityTier::of(stats.complexity) == ComplexityTier::HighlyDetailed {
        quality += 0.10;
    }
    if BrightnessTier::of(stats.brightness) == BrightnessTier::Dark {
        quality += 0.05;
    }
    let pixel_count = dimensions.0 as u64 * dimensions.1 as u64;
    if pixel_count > HIGH_RES_PIXELS {
        quality -= 0.05;
    }

    quality.clamp(MIN_ESTIMATED_QUALITY, MAX_ESTIMATED_QUALITY)
}

/// Brightness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessTier {
    Bright,
    MediumLit,
    Dark,
}

impl BrightnessTier {
    pub fn of(brightness: f32) -> Self {
        if brightness > 0.7 {
            Self::Bright
        } else if brightness > 0.3 {
            Self::MediumLit
        } else {
            Self::Dark
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bright => "bright",
            Self::MediumLit => "medium-lit",
            Self::Dark => "dark",
        }
    }
}

/// Complexity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityTier {
    HighlyDetailed,
    Simple,
}

impl ComplexityTier {
    pub fn of(complexity: f32) -> Self {
        if complexity > 0.4 {
            Self::HighlyDetailed
        } else {
            Self::Simple
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighlyDetailed => "highly detailed",
            Self::Simple => "simple",
        }
    }
}

/// Aspect of the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Landscape,
    Portrait,
    Square,
}

impl Framing {
    pub fn of((width, height): (u32, u32)) -> Self {
        match width.cmp(&height) {
            std::cmp::Ordering::Greater => Self::Landscape,
            std::cmp::Ordering::Less => Self::Portrait,
            std::cmp::Ordering::Equal => Self::Square,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Square => "square",
        }
    }
}

/// Hue of the most frequent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hue {
    Red,
    Green,
    Blue,
    /// No channel strictly dominates
    Neutral,
    /// No dominant color available
    Mixed,
}

impl Hue {
    /// Hue of the first (most frequent) color of the list.
    pub fn of(dominant_colors: &[[u8; 3]]) -> Self {
        let Some(&[r, g, b]) = dominant_colors.first() else {
            return Self::Mixed;
        };
        if r > g && r > b {
            Self::Red
        } else if g > r && g > b {
            Self::Green
        } else if b > r && b > g {
            Self::Blue
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red-toned",
            Self::Green => "green-toned",
            Self::Blue => "blue-toned",
            Self::Neutral => "neutral-toned",
            Self::Mixed => "mixed-color",
        }
    }
}

impl fmt::Display for Hue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
