//! Validated request and response structures for the three operations.
//!
//! Hosts (the CLI, the wasm bindings, an HTTP server) turn their transport's
//! upload into an [`ImageUpload`], call one of the `handle_*` functions and
//! serialize the result. Failures become an [`ErrorResponse`].

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::config::UploadLimits;
use crate::decode::ColorMode;
use crate::error::{ErrorCategory, InvalidInputError, PipelineError, Stage};
use crate::histogram::Rgb;
use crate::pipeline::{log_failure, Analysis, CompressedImage, Processor};
use crate::planner::{BitAllocation, OptimizationLevel, OutputFormat, PriorityRegion, Quality};
use crate::suggestions::Suggestions;

/// Reported in every response's metadata.
pub const COMPRESSION_ALGORITHM: &str = "selic-inspired";

/// An uploaded file as received by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUpload {
    /// MIME type declared by the client
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Check content type and size before anything is decoded.
    pub fn validate(&self, limits: &UploadLimits) -> Result<(), InvalidInputError> {
        if !self.content_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(InvalidInputError::NotAnImage(self.content_type.clone()));
        }
        if self.bytes.is_empty() {
            return Err(InvalidInputError::EmptyUpload);
        }
        let size = self.bytes.len() as u64;
        if size > limits.max_upload_bytes {
            return Err(InvalidInputError::TooLarge {
                size,
                limit: limits.max_upload_bytes,
            });
        }
        Ok(())
    }
}

/// Semantic fields of a response. Optional fields are omitted where an
/// operation does not report them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticsSummary {
    pub description: String,
    pub confidence: f32,
    pub complexity: f32,
    pub brightness: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_colors: Option<Vec<Rgb>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_quality: Option<f32>,
}

impl SemanticsSummary {
    fn basic(analysis: &Analysis) -> Self {
        Self {
            description: analysis.semantics.description.clone(),
            confidence: analysis.semantics.confidence,
            complexity: analysis.statistics.complexity,
            brightness: analysis.statistics.brightness,
            dominant_colors: None,
            estimated_quality: None,
        }
    }

    fn with_colors(analysis: &Analysis) -> Self {
        Self {
            dominant_colors: Some(analysis.statistics.dominant_colors.clone()),
            ..Self::basic(analysis)
        }
    }
}

/// Planned settings as reported by `analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsSummary {
    pub quality: Quality,
    pub format: OutputFormat,
    pub optimization_level: OptimizationLevel,
    pub bit_allocation: BitAllocation,
    pub priority_regions_count: usize,
    pub priority_regions: Vec<PriorityRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfoSummary {
    pub original_size: u64,
    /// `[width, height]`
    pub dimensions: [u32; 2],
    pub mode: ColorMode,
    pub format: String,
}

/// Metadata attached to compressed images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedMetadata {
    pub semantic_description: String,
    pub semantic_confidence: f32,
    pub estimated_complexity: f32,
    pub brightness_level: f32,
    pub dominant_colors: Vec<Rgb>,
    pub compression_algorithm: &'static str,
    pub optimized_quality: Quality,
    pub optimization_level: OptimizationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_savings_percent: Option<f64>,
}

impl EnhancedMetadata {
    fn new(analysis: &Analysis) -> Self {
        Self {
            semantic_description: analysis.semantics.description.clone(),
            semantic_confidence: analysis.semantics.confidence,
            estimated_complexity: analysis.statistics.complexity,
            brightness_level: analysis.statistics.brightness,
            dominant_colors: analysis.statistics.dominant_colors.clone(),
            compression_algorithm: COMPRESSION_ALGORITHM,
            optimized_quality: analysis.settings.quality,
            optimization_level: analysis.settings.optimization_level,
            compression_ratio: None,
            size_savings_percent: None,
        }
    }
}

/// Response of `analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub semantics: SemanticsSummary,
    pub compression_settings: SettingsSummary,
    pub image_info: ImageInfoSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionStats {
    pub original_size: u64,
    pub compressed_size: u64,
    /// Rounded to 2 decimals
    pub compression_ratio: f64,
    /// Rounded to 1 decimal
    pub size_savings_percent: f64,
    pub quality_used: Quality,
    pub format_used: OutputFormat,
}

/// Response of `compress`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressResponse {
    /// Encoded image, base64 (standard alphabet, padded)
    pub compressed_image: String,
    pub semantics: SemanticsSummary,
    pub compression_stats: CompressionStats,
    pub enhanced_metadata: EnhancedMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessCompression {
    pub original_size: u64,
    pub optimized_size: u64,
    /// Rounded to 2 decimals
    pub compression_ratio: f64,
    /// Rounded to 1 decimal
    pub size_savings_percent: f64,
    pub quality: Quality,
    pub format: OutputFormat,
    pub algorithm: &'static str,
}

/// Response of `process`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    /// Encoded image, base64 (standard alphabet, padded)
    pub processed_image: String,
    pub semantics: SemanticsSummary,
    pub compression: ProcessCompression,
    pub suggestions: Suggestions,
    pub enhanced_metadata: EnhancedMetadata,
}

/// Structured failure for any operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// Taxonomy name, e.g. "DecodeError"
    pub error: &'static str,
    pub stage: Stage,
    pub category: ErrorCategory,
    pub message: String,
    pub status: u16,
}

impl From<&PipelineError> for ErrorResponse {
    fn from(err: &PipelineError) -> Self {
        Self {
            error: err.kind(),
            stage: err.stage(),
            category: err.category(),
            message: err.to_string(),
            status: err.status_code(),
        }
    }
}

/// Validate the upload, logging a rejection the same way pipeline failures
/// are logged.
fn validate(processor: &Processor, upload: &ImageUpload) -> Result<(), PipelineError> {
    upload
        .validate(&processor.config().limits)
        .map_err(PipelineError::from)
        .inspect_err(log_failure)
}

/// Analyze an upload.
pub fn handle_analyze(
    processor: &Processor,
    upload: &ImageUpload,
) -> Result<AnalyzeResponse, PipelineError> {
    validate(processor, upload)?;
    let analysis = processor.analyze(&upload.bytes)?;

    let settings = &analysis.settings;
    Ok(AnalyzeResponse {
        semantics: SemanticsSummary {
            estimated_quality: Some(analysis.semantics.estimated_quality),
            ..SemanticsSummary::with_colors(&analysis)
        },
        compression_settings: SettingsSummary {
            quality: settings.quality,
            format: settings.format,
            optimization_level: settings.optimization_level,
            bit_allocation: settings.bit_allocation,
            priority_regions_count: settings.priority_regions.len(),
            priority_regions: settings.priority_regions.clone(),
        },
        image_info: ImageInfoSummary {
            original_size: analysis.image.original_size,
            dimensions: [analysis.image.width, analysis.image.height],
            mode: analysis.image.mode,
            format: analysis.image.format.clone(),
        },
    })
}

/// Compress an upload. Also returns the raw encoded bytes.
pub fn handle_compress(
    processor: &Processor,
    upload: &ImageUpload,
) -> Result<(CompressResponse, Vec<u8>), PipelineError> {
    validate(processor, upload)?;
    let compressed = processor.compress(&upload.bytes)?;
    let response = compress_response(&compressed);
    Ok((response, compressed.encoded))
}

/// Compress an upload and suggest a caption. Also returns the raw encoded
/// bytes.
pub fn handle_process(
    processor: &Processor,
    upload: &ImageUpload,
) -> Result<(ProcessResponse, Vec<u8>), PipelineError> {
    validate(processor, upload)?;
    let processed = processor.process(&upload.bytes)?;
    let compressed = processed.compressed;
    let analysis = &compressed.analysis;
    let outcome = compressed.outcome;

    let response = ProcessResponse {
        success: true,
        processed_image: general_purpose::STANDARD.encode(&compressed.encoded),
        semantics: SemanticsSummary::with_colors(analysis),
        compression: ProcessCompression {
            original_size: outcome.original_size,
            optimized_size: outcome.encoded_size,
            compression_ratio: round_to(outcome.ratio(), 2),
            size_savings_percent: round_to(outcome.savings_percent(), 1),
            quality: analysis.settings.quality,
            format: analysis.settings.format,
            algorithm: COMPRESSION_ALGORITHM,
        },
        suggestions: processed.suggestions,
        enhanced_metadata: EnhancedMetadata {
            compression_ratio: Some(outcome.ratio()),
            size_savings_percent: Some(outcome.savings_percent()),
            ..EnhancedMetadata::new(analysis)
        },
    };
    Ok((response, compressed.encoded))
}

fn compress_response(compressed: &CompressedImage) -> CompressResponse {
    let analysis = &compressed.analysis;
    let outcome = compressed.outcome;

    CompressResponse {
        compressed_image: general_purpose::STANDARD.encode(&compressed.encoded),
        semantics: SemanticsSummary::basic(analysis),
        compression_stats: CompressionStats {
            original_size: outcome.original_size,
            compressed_size: outcome.encoded_size,
            compression_ratio: round_to(outcome.ratio(), 2),
            size_savings_percent: round_to(outcome.savings_percent(), 1),
            quality_used: analysis.settings.quality,
            format_used: analysis.settings.format,
        },
        enhanced_metadata: EnhancedMetadata::new(analysis),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::test_support::{checkerboard_image, encode_png, two_tone_image};

    fn processor() -> Processor {
        Processor::new(PipelineConfig::default()).unwrap()
    }

    fn png_upload() -> ImageUpload {
        ImageUpload::new(
            "image/png",
            encode_png(&two_tone_image(224, 224, [255, 255, 255], [240, 240, 240])),
        )
    }

    #[test]
    fn test_validate_content_type() {
        let limits = UploadLimits::default();
        assert!(ImageUpload::new("image/jpeg", vec![1]).validate(&limits).is_ok());
        assert!(ImageUpload::new("IMAGE/PNG", vec![1]).validate(&limits).is_ok());
        assert_eq!(
            ImageUpload::new("text/plain", vec![1]).validate(&limits),
            Err(InvalidInputError::NotAnImage("text/plain".into()))
        );
    }

    #[test]
    fn test_validate_size() {
        let limits = UploadLimits {
            max_upload_bytes: 4,
        };
        assert!(ImageUpload::new("image/png", vec![0; 4]).validate(&limits).is_ok());
        assert_eq!(
            ImageUpload::new("image/png", vec![0; 5]).validate(&limits),
            Err(InvalidInputError::TooLarge { size: 5, limit: 4 })
        );
        assert_eq!(
            ImageUpload::new("image/png", vec![]).validate(&limits),
            Err(InvalidInputError::EmptyUpload)
        );
    }

    #[test]
    fn test_rejected_before_decode() {
        // Valid image bytes, wrong declared type
        let upload = ImageUpload::new("application/pdf", png_upload().bytes);
        let err = handle_analyze(&processor(), &upload).unwrap_err();
        assert_eq!(err.stage(), Stage::Validate);

        let response = ErrorResponse::from(&err);
        assert_eq!(response.status, 400);
        assert_eq!(response.error, "InvalidInputError");
    }

    #[test]
    fn test_decode_failure_response() {
        let upload = ImageUpload::new("image/png", b"not a png".to_vec());
        let err = handle_process(&processor(), &upload).unwrap_err();
        let json = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(json["error"], "DecodeError");
        assert_eq!(json["stage"], "decode");
        assert_eq!(json["category"], "client");
        assert_eq!(json["status"], 422);
    }

    #[test]
    fn test_analyze_response_shape() {
        let response = handle_analyze(&processor(), &png_upload()).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["image_info"]["dimensions"], serde_json::json!([224, 224]));
        assert_eq!(json["image_info"]["mode"], "RGB");
        assert_eq!(json["image_info"]["format"], "PNG");
        assert_eq!(json["compression_settings"]["format"], "WEBP");
        assert_eq!(json["compression_settings"]["optimization_level"], "standard");
        assert_eq!(json["compression_settings"]["priority_regions_count"], 0);
        assert_eq!(
            json["semantics"]["dominant_colors"],
            serde_json::json!([[255, 255, 255], [240, 240, 240]])
        );
        assert!(json["semantics"]["estimated_quality"].is_number());
    }

    #[test]
    fn test_compress_response() {
        let (response, encoded) = handle_compress(&processor(), &png_upload()).unwrap();

        assert_eq!(
            general_purpose::STANDARD.decode(&response.compressed_image).unwrap(),
            encoded
        );
        assert_eq!(response.compression_stats.compressed_size, encoded.len() as u64);
        assert_eq!(response.compression_stats.format_used, OutputFormat::Webp);
        assert_eq!(response.enhanced_metadata.compression_algorithm, "selic-inspired");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["semantics"].get("dominant_colors").is_none());
        assert!(json["enhanced_metadata"].get("compression_ratio").is_none());
    }

    #[test]
    fn test_process_response() {
        let upload = ImageUpload::new("image/png", encode_png(&checkerboard_image(224, 224, 2)));
        let (response, encoded) = handle_process(&processor(), &upload).unwrap();

        assert!(response.success);
        assert_eq!(response.compression.optimized_size, encoded.len() as u64);
        assert_eq!(response.compression.format, OutputFormat::Jpeg);
        assert_eq!(response.compression.algorithm, "selic-inspired");
        assert!(response.suggestions.caption.starts_with("✨ A "));
        assert!(response.suggestions.hashtags.contains(&"#detailed".to_string()));
        assert_eq!(response.semantics.dominant_colors.as_ref().map(Vec::len), Some(5));

        let ratio = response.enhanced_metadata.compression_ratio.unwrap();
        assert_eq!(response.compression.compression_ratio, round_to(ratio, 2));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(42.06, 1), 42.1);
        assert_eq!(round_to(-12.34, 1), -12.3);
    }
}
