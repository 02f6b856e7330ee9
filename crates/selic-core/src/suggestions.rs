//! Caption and hashtag suggestions derived from a classification.

use serde::Serialize;

use crate::planner::{CompressionSettings, Quality};
use crate::semantics::{BrightnessTier, ComplexityTier, SemanticResult};
use crate::statistics::ImageStatistics;

/// Decorative marker in front of every caption.
const CAPTION_MARKER: &str = "✨";
const MAX_HASHTAGS: usize = 2;

/// Suggested post text for a processed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestions {
    pub caption: String,
    /// At most two tags, in rule order
    pub hashtags: Vec<String>,
    pub optimal_quality: Quality,
}

/// Tags from fixed rules, capped at two.
///
/// Rules in order: brightness (`#bright` / `#moody`), detail (`#detailed`),
/// framing from the description (`#portrait`, else `#landscape`).
pub fn hashtags(stats: &ImageStatistics, semantics: &SemanticResult) -> Vec<String> {
    let mut tags = Vec::new();

    match BrightnessTier::of(stats.brightness) {
        BrightnessTier::Bright => tags.push("#bright"),
        BrightnessTier::Dark => tags.push("#moody"),
        BrightnessTier::MediumLit => {}
    }
    if ComplexityTier::of(stats.complexity) == ComplexityTier::HighlyDetailed {
        tags.push("#detailed");
    }
    if semantics.description.contains("portrait") {
        tags.push("#portrait");
    } else if semantics.description.contains("landscape") {
        tags.push("#landscape");
    }

    tags.into_iter()
        .take(MAX_HASHTAGS)
        .map(str::to_string)
        .collect()
}

/// Build caption, hashtags and the recommended quality.
pub fn suggest(
    stats: &ImageStatistics,
    semantics: &SemanticResult,
    settings: &CompressionSettings,
) -> Suggestions {
    let hashtags = hashtags(stats, semantics);

    let mut caption = format!("{CAPTION_MARKER} {}", semantics.description);
    if !hashtags.is_empty() {
        caption.push(' ');
        caption.push_str(&hashtags.join(" "));
    }

    Suggestions {
        caption,
        hashtags,
        optimal_quality: settings.quality,
    }
}
