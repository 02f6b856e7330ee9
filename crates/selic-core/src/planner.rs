//! Compression planning.
//!
//! Maps statistics and a semantic classification to concrete encoder
//! settings. Planning is a pure function: the same inputs always give the
//! same [`CompressionSettings`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::semantics::SemanticResult;
use crate::statistics::ImageStatistics;

/// Complexity above which textured content goes to JPEG.
const JPEG_COMPLEXITY: f32 = 0.4;
/// Images with at most this many dominant colors are considered flat.
const FLAT_COLOR_COUNT: usize = 3;
/// Complexity above which preprocessing is enabled.
const HIGH_OPTIMIZATION_COMPLEXITY: f32 = 0.3;

/// Encoder quality on the codec-native 0–100 scale, always within [70, 95].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: Quality = Quality(70);
    pub const MAX: Quality = Quality(95);

    /// Convert a fractional quality (0.0 to 1.0) by rounding to the nearest
    /// percent, then clamping. NaN maps to the minimum.
    pub fn from_fraction(fraction: f32) -> Self {
        let percent = (fraction * 100.0).round();
        if percent.is_nan() {
            return Self::MIN;
        }
        Self((percent.clamp(Self::MIN.0 as f32, Self::MAX.0 as f32)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Webp => "WEBP",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether preprocessing runs before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Standard,
    High,
}

impl OptimizationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::High => "high",
        }
    }
}

/// Relative weight per frequency band.
///
/// Informational only: neither encoder supports per-band quantization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BitAllocation {
    #[serde(rename = "high_frequency")]
    pub high: f32,
    #[serde(rename = "mid_frequency")]
    pub mid: f32,
    #[serde(rename = "low_frequency")]
    pub low: f32,
    #[serde(rename = "semantic_regions")]
    pub semantic: f32,
}

impl BitAllocation {
    fn for_complexity(complexity: f32) -> Self {
        Self {
            high: 1.0 + complexity,
            mid: 1.0,
            low: 1.0 - 0.3 * complexity,
            semantic: 1.4,
        }
    }
}

/// A spatial area flagged for extra fidelity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityRegion {
    pub region: String,
    pub weight: f32,
    pub reason: String,
}

/// Settings handed to the preprocessor and encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionSettings {
    pub quality: Quality,
    pub format: OutputFormat,
    pub optimization_level: OptimizationLevel,
    pub bit_allocation: BitAllocation,
    pub priority_regions: Vec<PriorityRegion>,
}

/// Pick the output container from complexity and color count.
pub fn select_format(complexity: f32, dominant_color_count: usize) -> OutputFormat {
    if complexity > JPEG_COMPLEXITY {
        OutputFormat::Jpeg
    } else if dominant_color_count <= FLAT_COLOR_COUNT {
        OutputFormat::Webp
    } else {
        OutputFormat::Jpeg
    }
}

/// Derive encoder settings for one image.
///
/// # Example
/// ```
/// use selic_core::planner::{plan, OutputFormat};
/// use selic_core::semantics::SemanticResult;
/// use selic_core::statistics::ImageStatistics;
///
/// let stats = ImageStatistics { brightness: 0.9, complexity: 0.1, dominant_colors: vec![[255; 3]] };
/// let semantics = SemanticResult {
///     description: "A bright simple square neutral-toned image".into(),
///     confidence: 0.85,
///     estimated_quality: 0.85,
/// };
/// let settings = plan(&stats, &semantics);
/// assert_eq!(settings.quality.get(), 85);
/// assert_eq!(settings.format, OutputFormat::Webp);
/// ```
pub fn plan(stats: &ImageStatistics, semantics: &SemanticResult) -> CompressionSettings {
    let priority_regions = if semantics.description.contains("portrait") {
        vec![PriorityRegion {
            region: "center".to_string(),
            weight: 1.5,
            reason: "likely subject/face".to_string(),
        }]
    } else {
        Vec::new()
    };

    let optimization_level = if stats.complexity > HIGH_OPTIMIZATION_COMPLEXITY {
        OptimizationLevel::High
    } else {
        OptimizationLevel::Standard
    };

    CompressionSettings {
        quality: Quality::from_fraction(semantics.estimated_quality),
        format: select_format(stats.complexity, stats.dominant_colors.len()),
        optimization_level,
        bit_allocation: BitAllocation::for_complexity(stats.complexity),
        priority_regions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(complexity: f32, colors: usize) -> ImageStatistics {
        ImageStatistics {
            brightness: 0.5,
            complexity,
            dominant_colors: (0..colors).map(|i| [i as u8; 3]).collect(),
        }
    }

    fn semantics(description: &str, estimated_quality: f32) -> SemanticResult {
        SemanticResult {
            description: description.to_string(),
            confidence: 0.85,
            estimated_quality,
        }
    }

    #[test]
    fn test_quality_rounds_to_nearest() {
        // 0.8 is not exactly representable; rounding still yields 80
        assert_eq!(Quality::from_fraction(0.85 - 0.05).get(), 80);
        assert_eq!(Quality::from_fraction(0.855).get(), 86);
        assert_eq!(Quality::from_fraction(0.95).get(), 95);
    }

    #[test]
    fn test_quality_clamps() {
        assert_eq!(Quality::from_fraction(0.1), Quality::MIN);
        assert_eq!(Quality::from_fraction(2.0), Quality::MAX);
        assert_eq!(Quality::from_fraction(f32::NAN), Quality::MIN);
    }

    #[test]
    fn test_format_selection_order() {
        assert_eq!(select_format(0.5, 1), OutputFormat::Jpeg);
        assert_eq!(select_format(0.4, 3), OutputFormat::Webp);
        assert_eq!(select_format(0.1, 0), OutputFormat::Webp);
        assert_eq!(select_format(0.1, 4), OutputFormat::Jpeg);
    }

    #[test]
    fn test_bit_allocation() {
        let allocation = plan(&stats(0.5, 5), &semantics("x", 0.85)).bit_allocation;
        assert!((allocation.high - 1.5).abs() < 1e-6);
        assert_eq!(allocation.mid, 1.0);
        assert!((allocation.low - 0.85).abs() < 1e-6);
        assert_eq!(allocation.semantic, 1.4);
    }

    #[test]
    fn test_portrait_gets_priority_region() {
        let settings = plan(
            &stats(0.1, 2),
            &semantics("A bright simple portrait red-toned image", 0.85),
        );
        assert_eq!(settings.priority_regions.len(), 1);
        assert_eq!(settings.priority_regions[0].region, "center");
        assert_eq!(settings.priority_regions[0].weight, 1.5);
        assert_eq!(settings.priority_regions[0].reason, "likely subject/face");

        let settings = plan(
            &stats(0.1, 2),
            &semantics("A bright simple landscape red-toned image", 0.85),
        );
        assert!(settings.priority_regions.is_empty());
    }

    #[test]
    fn test_optimization_level_threshold() {
        assert_eq!(
            plan(&stats(0.3, 2), &semantics("x", 0.85)).optimization_level,
            OptimizationLevel::Standard
        );
        assert_eq!(
            plan(&stats(0.31, 2), &semantics("x", 0.85)).optimization_level,
            OptimizationLevel::High
        );
    }

    #[test]
    fn test_serialized_shape() {
        let settings = plan(&stats(0.0, 2), &semantics("x", 0.85));
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["quality"], 85);
        assert_eq!(json["format"], "WEBP");
        assert_eq!(json["optimization_level"], "standard");
        assert_eq!(json["bit_allocation"]["high_frequency"], 1.0);
        assert!(json["bit_allocation"]["semantic_regions"].is_number());
        assert_eq!(json["priority_regions"], serde_json::json!([]));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
