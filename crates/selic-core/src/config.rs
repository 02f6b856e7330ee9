//! Pipeline configuration.
//!
//! Every field defaults to the constant the pipeline was tuned with, so an
//! empty configuration reproduces the stock behavior. Configuration is read
//! once when a [`Processor`](crate::Processor) is built and never changes
//! afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::statistics::MAX_DOMINANT_COLORS;

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("analysis.size must be non-zero")]
    ZeroAnalysisSize,

    #[error("analysis.complexity_normalization must be positive, got {0}")]
    InvalidNormalization(f32),

    #[error("analysis.dominant_colors must be in 1..={max}, got {value}")]
    DominantColorsOutOfRange { value: usize, max: usize },

    #[error("semantics.confidence must be in (0, 1], got {0}")]
    InvalidConfidence(f32),

    #[error("preprocess.{name} must be positive, got {value}")]
    InvalidEnhancement { name: &'static str, value: f32 },

    #[error("limits.max_upload_bytes must be non-zero")]
    ZeroUploadLimit,

    #[error("semantics.model is \"learned\" but no caption model was supplied")]
    MissingCaptionModel,
}

/// Top-level configuration for the pipeline and its boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub analysis: AnalysisConfig,
    pub semantics: SemanticConfig,
    pub preprocess: PreprocessConfig,
    pub limits: UploadLimits,
}

impl PipelineConfig {
    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.size == 0 {
            return Err(ConfigError::ZeroAnalysisSize);
        }
        if !is_positive(self.analysis.complexity_normalization) {
            return Err(ConfigError::InvalidNormalization(
                self.analysis.complexity_normalization,
            ));
        }
        let colors = self.analysis.dominant_colors;
        if colors == 0 || colors > MAX_DOMINANT_COLORS {
            return Err(ConfigError::DominantColorsOutOfRange {
                value: colors,
                max: MAX_DOMINANT_COLORS,
            });
        }
        let confidence = self.semantics.confidence;
        if !is_positive(confidence) || confidence > 1.0 {
            return Err(ConfigError::InvalidConfidence(self.semantics.confidence));
        }
        for (name, value) in [
            ("sharpness", self.preprocess.sharpness),
            ("contrast", self.preprocess.contrast),
        ] {
            if !is_positive(value) {
                return Err(ConfigError::InvalidEnhancement { name, value });
            }
        }
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }
        Ok(())
    }
}

/// Rejects NaN along with zero and negative values.
fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Parameters of the statistics pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Edge length of the square analysis image.
    pub size: u32,
    /// Mean gradient magnitude that maps to a complexity of 1.0.
    pub complexity_normalization: f32,
    /// Maximum number of dominant colors reported, at most 5.
    pub dominant_colors: usize,
    /// Colors whose channels all lie within this distance of a more
    /// frequent color are counted as that color. 0 counts exact matches.
    pub color_tolerance: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            size: 224,
            complexity_normalization: 128.0,
            dominant_colors: 5,
            color_tolerance: 12,
        }
    }
}

/// Which semantic model implementation classifies images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticModelKind {
    /// Deterministic rule table.
    #[default]
    RuleBased,
    /// Caller-supplied captioning model.
    Learned,
}

/// Semantic classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SemanticConfig {
    pub model: SemanticModelKind,
    /// Confidence reported by the rule-based classifier.
    pub confidence: f32,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            model: SemanticModelKind::RuleBased,
            confidence: 0.85,
        }
    }
}

/// Enhancement factors applied when the plan asks for high optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessConfig {
    pub sharpness: f32,
    pub contrast: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            sharpness: 1.1,
            contrast: 1.05,
        }
    }
}

/// Limits checked at the request boundary before decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadLimits {
    pub max_upload_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}
