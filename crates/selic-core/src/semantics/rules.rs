//! Deterministic rule-table classifier.

use super::{
    estimate_quality, AnalysisError, BrightnessTier, ComplexityTier, Framing, Hue, SemanticModel,
    SemanticResult,
};
use crate::decode::PixelBuffer;
use crate::statistics::ImageStatistics;

/// Describes an image from its statistics alone.
///
/// The description reads `"A {brightness} {complexity} {framing} {hue} image"`
/// and the confidence is the configured constant.
#[derive(Debug, Clone)]
pub struct RuleBasedClassifier {
    confidence: f32,
}

impl RuleBasedClassifier {
    pub fn new(confidence: f32) -> Self {
        Self { confidence }
    }

    /// Build the description for a set of statistics.
    pub fn describe(dimensions: (u32, u32), stats: &ImageStatistics) -> String {
        format!(
            "A {} {} {} {} image",
            BrightnessTier::of(stats.brightness).as_str(),
            ComplexityTier::of(stats.complexity).as_str(),
            Framing::of(dimensions).as_str(),
            Hue::of(&stats.dominant_colors),
        )
    }
}

impl SemanticModel for RuleBasedClassifier {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    fn classify(
        &self,
        dimensions: (u32, u32),
        stats: &ImageStatistics,
        _analysis: &PixelBuffer,
    ) -> Result<SemanticResult, AnalysisError> {
        Ok(SemanticResult {
            description: Self::describe(dimensions, stats),
            confidence: self.confidence,
            estimated_quality: estimate_quality(stats, dimensions),
        })
    }
}
