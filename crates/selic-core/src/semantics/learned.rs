//! Classification backed by an external captioning model.

use std::sync::Arc;

use super::{estimate_quality, AnalysisError, SemanticModel, SemanticResult};
use crate::decode::PixelBuffer;
use crate::statistics::ImageStatistics;

/// Caption produced by a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCaption {
    pub description: String,
    /// Model-reported confidence, expected in (0, 1]
    pub confidence: f32,
}

/// An image captioning backend.
///
/// Implementations receive the RGB analysis image. A processor shares one
/// instance between all requests it serves.
pub trait CaptionModel: Send + Sync {
    fn caption(&self, image: &PixelBuffer) -> Result<ModelCaption, AnalysisError>;
}

/// Takes description and confidence from a [`CaptionModel`]; the estimated
/// quality still comes from the shared statistics rules.
#[derive(Clone)]
pub struct ModelBackedClassifier {
    model: Arc<dyn CaptionModel>,
}

impl ModelBackedClassifier {
    pub fn new(model: Arc<dyn CaptionModel>) -> Self {
        Self { model }
    }
}

impl SemanticModel for ModelBackedClassifier {
    fn name(&self) -> &'static str {
        "learned"
    }

    fn classify(
        &self,
        dimensions: (u32, u32),
        stats: &ImageStatistics,
        analysis: &PixelBuffer,
    ) -> Result<SemanticResult, AnalysisError> {
        let caption = self.model.caption(analysis)?;

        if !(caption.confidence.is_finite() && caption.confidence > 0.0 && caption.confidence <= 1.0)
        {
            return Err(AnalysisError::InvalidConfidence(caption.confidence));
        }
        let description = caption.description.trim();
        if description.is_empty() {
            return Err(AnalysisError::EmptyDescription);
        }

        Ok(SemanticResult {
            description: description.to_string(),
            confidence: caption.confidence,
            estimated_quality: estimate_quality(stats, dimensions),
        })
    }
}
