//! The analysis → planning → preprocessing → encoding pipeline.
//!
//! A [`Processor`] is built once from a validated [`PipelineConfig`] and then
//! shared read-only by every request. It holds no mutable state: each call
//! decodes its own bytes, runs every stage in order, and either returns the
//! complete result or the first error. Partial results are never returned.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{ConfigError, PipelineConfig};
use crate::decode::{self, ColorMode, DecodedImage};
use crate::encode::{self, EncodeError};
use crate::error::{PipelineError, Stage};
use crate::planner::{self, CompressionSettings};
use crate::preprocess::preprocess;
use crate::semantics::{build_semantic_model, CaptionModel, SemanticModel, SemanticResult};
use crate::statistics::{self, ImageStatistics};
use crate::suggestions::{suggest, Suggestions};

/// Facts about the uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    /// Upload size in bytes
    pub original_size: u64,
    pub width: u32,
    pub height: u32,
    pub mode: ColorMode,
    /// Container name, e.g. "PNG"
    pub format: String,
}

/// Result of the analysis stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub image: ImageInfo,
    pub statistics: ImageStatistics,
    pub semantics: SemanticResult,
    pub settings: CompressionSettings,
}

/// Sizes before and after encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionOutcome {
    pub original_size: u64,
    pub encoded_size: u64,
}

impl CompressionOutcome {
    /// Returns `None` when either size is zero; ratio and savings are
    /// undefined there.
    pub fn new(original_size: u64, encoded_size: u64) -> Option<Self> {
        if original_size == 0 || encoded_size == 0 {
            return None;
        }
        Some(Self {
            original_size,
            encoded_size,
        })
    }

    /// `original_size / encoded_size`
    pub fn ratio(&self) -> f64 {
        self.original_size as f64 / self.encoded_size as f64
    }

    /// `100 * (original_size - encoded_size) / original_size`. Negative when
    /// the encoded image is larger than the upload.
    pub fn savings_percent(&self) -> f64 {
        100.0 * (self.original_size as f64 - self.encoded_size as f64) / self.original_size as f64
    }
}

/// Result of a full compression run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    pub analysis: Analysis,
    pub encoded: Vec<u8>,
    pub outcome: CompressionOutcome,
}

/// Compression plus post suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub compressed: CompressedImage,
    pub suggestions: Suggestions,
}

/// Content-adaptive image processor.
pub struct Processor {
    config: PipelineConfig,
    model: Box<dyn SemanticModel>,
}

impl Processor {
    /// Build a processor with the semantic model named in the config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for out-of-range values, or when the config
    /// selects the learned model (use [`Processor::with_caption_model`]).
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// Build a processor that can use a captioning model.
    pub fn with_caption_model(
        config: PipelineConfig,
        caption_model: Arc<dyn CaptionModel>,
    ) -> Result<Self, ConfigError> {
        Self::build(config, Some(caption_model))
    }

    fn build(
        config: PipelineConfig,
        caption_model: Option<Arc<dyn CaptionModel>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let model = build_semantic_model(&config.semantics, caption_model)?;
        log::debug!("processor ready with {} semantic model", model.name());
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the active semantic model.
    pub fn semantic_model(&self) -> &'static str {
        self.model.name()
    }

    /// Decode and analyze an upload without encoding it.
    pub fn analyze(&self, bytes: &[u8]) -> Result<Analysis, PipelineError> {
        let result = self.decode(bytes).and_then(|decoded| self.analyze_decoded(&decoded, bytes.len()));
        match &result {
            Ok(analysis) => log::info!(
                "analyzed {}x{} {}: \"{}\"",
                analysis.image.width,
                analysis.image.height,
                analysis.image.format,
                analysis.semantics.description
            ),
            Err(err) => log_failure(err),
        }
        result
    }

    /// Analyze, preprocess and encode an upload.
    pub fn compress(&self, bytes: &[u8]) -> Result<CompressedImage, PipelineError> {
        let result = self.run(bytes);
        match &result {
            Ok(compressed) => log::info!(
                "compressed {} -> {} bytes as {} q{} (ratio {:.2})",
                compressed.outcome.original_size,
                compressed.outcome.encoded_size,
                compressed.analysis.settings.format,
                compressed.analysis.settings.quality,
                compressed.outcome.ratio()
            ),
            Err(err) => log_failure(err),
        }
        result
    }

    /// [`compress`](Self::compress), plus caption and hashtag suggestions.
    pub fn process(&self, bytes: &[u8]) -> Result<ProcessedImage, PipelineError> {
        let compressed = self.compress(bytes)?;
        let analysis = &compressed.analysis;
        let suggestions = suggest(&analysis.statistics, &analysis.semantics, &analysis.settings);
        log::debug!("suggested caption \"{}\"", suggestions.caption);

        Ok(ProcessedImage {
            compressed,
            suggestions,
        })
    }

    fn run(&self, bytes: &[u8]) -> Result<CompressedImage, PipelineError> {
        let decoded = self.decode(bytes)?;
        let analysis = self.analyze_decoded(&decoded, bytes.len())?;
        let settings = &analysis.settings;

        log::debug!("preprocess: {} optimization", settings.optimization_level.as_str());
        let prepared = preprocess(&decoded.pixels, settings, &self.config.preprocess);

        let encoded = encode::encode(&prepared, settings)
            .map_err(|e| PipelineError::encode(Stage::Encode, e))?;
        log::debug!("encode: {} bytes of {}", encoded.len(), settings.format);

        let outcome = CompressionOutcome::new(bytes.len() as u64, encoded.len() as u64)
            .ok_or_else(|| PipelineError::encode(Stage::Summarize, EncodeError::EmptyOutput(settings.format)))?;

        Ok(CompressedImage {
            analysis,
            encoded,
            outcome,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, PipelineError> {
        let decoded = decode::decode_image(bytes).map_err(|e| PipelineError::decode(Stage::Decode, e))?;
        let (width, height) = decoded.pixels.dimensions();
        log::debug!(
            "decode: {}x{} {} {} ({} bytes)",
            width,
            height,
            decoded.pixels.mode(),
            decoded.format,
            bytes.len()
        );
        Ok(decoded)
    }

    fn analyze_decoded(
        &self,
        decoded: &DecodedImage,
        original_size: usize,
    ) -> Result<Analysis, PipelineError> {
        let pixels = &decoded.pixels;
        let dimensions = pixels.dimensions();

        let analysis_image = statistics::analysis_image(pixels, &self.config.analysis)
            .map_err(|e| PipelineError::decode(Stage::Analyze, e))?;
        let stats = statistics::measure(&analysis_image, &self.config.analysis);
        log::debug!(
            "analyze: brightness={:.3} complexity={:.3} colors={}",
            stats.brightness,
            stats.complexity,
            stats.dominant_colors.len()
        );

        let semantics = self
            .model
            .classify(dimensions, &stats, &analysis_image)
            .map_err(|e| PipelineError::analysis(Stage::Classify, e))?;
        log::debug!(
            "classify ({}): \"{}\" confidence={}",
            self.model.name(),
            semantics.description,
            semantics.confidence
        );

        let settings = planner::plan(&stats, &semantics);
        log::debug!(
            "plan: {} q{} {} optimization, {} priority regions",
            settings.format,
            settings.quality,
            settings.optimization_level.as_str(),
            settings.priority_regions.len()
        );

        Ok(Analysis {
            image: ImageInfo {
                original_size: original_size as u64,
                width: dimensions.0,
                height: dimensions.1,
                mode: pixels.mode(),
                format: decoded.format.clone(),
            },
            statistics: stats,
            semantics,
            settings,
        })
    }
}

pub(crate) fn log_failure(err: &PipelineError) {
    log::error!("{} stage failed ({}): {}", err.stage(), err.kind(), err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SemanticModelKind;
    use crate::planner::{OptimizationLevel, OutputFormat};
    use crate::semantics::{AnalysisError, ModelCaption};
    use crate::test_support::{
        checkerboard_image, encode_png, jpeg_with_orientation, solid_image, two_tone_image,
    };
    use crate::decode::PixelBuffer;

    fn processor() -> Processor {
        Processor::new(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_processor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Processor>();
    }

    #[test]
    fn test_bright_flat_image_goes_to_webp() {
        let png = encode_png(&two_tone_image(224, 224, [255, 255, 255], [240, 240, 240]));
        let processed = processor().process(&png).unwrap();
        let analysis = &processed.compressed.analysis;

        assert!(analysis.semantics.description.starts_with("A bright simple square"));
        assert_eq!(analysis.settings.format, OutputFormat::Webp);
        assert_eq!(analysis.settings.optimization_level, OptimizationLevel::Standard);
        assert!(processed.suggestions.hashtags.contains(&"#bright".to_string()));
        assert_eq!(&processed.compressed.encoded[8..12], b"WEBP");
    }

    #[test]
    fn test_flat_image_goes_to_webp_at_any_size() {
        for size in [300, 448, 1000] {
            let png = encode_png(&two_tone_image(size, size, [255, 255, 255], [240, 240, 240]));
            let analysis = processor().analyze(&png).unwrap();

            assert!(analysis.statistics.dominant_colors.len() <= 3, "size = {}", size);
            assert_eq!(analysis.settings.format, OutputFormat::Webp, "size = {}", size);
        }
    }

    #[test]
    fn test_exif_rotation_reaches_analysis() {
        let source = two_tone_image(40, 20, [250, 250, 250], [10, 10, 10]);
        let analysis = processor().analyze(&jpeg_with_orientation(&source, 6)).unwrap();

        assert_eq!((analysis.image.width, analysis.image.height), (20, 40));
        assert_eq!(analysis.image.format, "JPEG");
        assert!(
            analysis.semantics.description.contains("portrait"),
            "description = {}",
            analysis.semantics.description
        );
    }

    #[test]
    fn test_checkerboard_goes_to_jpeg() {
        let png = encode_png(&checkerboard_image(224, 224, 2));
        let processed = processor().process(&png).unwrap();
        let analysis = &processed.compressed.analysis;

        assert!(analysis.semantics.description.contains("highly detailed"));
        assert_eq!(analysis.settings.format, OutputFormat::Jpeg);
        assert_eq!(analysis.settings.optimization_level, OptimizationLevel::High);
        assert!(processed.suggestions.hashtags.contains(&"#detailed".to_string()));
        assert_eq!(&processed.compressed.encoded[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_non_image_fails_with_decode_error() {
        let err = processor().process(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PipelineError::Decode { stage: Stage::Decode, .. }));
    }

    #[test]
    fn test_deterministic_output() {
        let png = encode_png(&checkerboard_image(96, 64, 3));
        let p = processor();
        let a = p.compress(&png).unwrap();
        let b = p.compress(&png).unwrap();
        assert_eq!(a.encoded, b.encoded);
        assert_eq!(a.analysis, b.analysis);
    }

    #[test]
    fn test_analyze_reports_image_info() {
        let png = encode_png(&solid_image(120, 80, [10, 120, 10]));
        let analysis = processor().analyze(&png).unwrap();

        assert_eq!(analysis.image.original_size, png.len() as u64);
        assert_eq!((analysis.image.width, analysis.image.height), (120, 80));
        assert_eq!(analysis.image.mode, ColorMode::Rgb);
        assert_eq!(analysis.image.format, "PNG");
        assert_eq!(
            analysis.semantics.description,
            "A dark simple landscape green-toned image"
        );
    }

    #[test]
    fn test_outcome_math() {
        let outcome = CompressionOutcome::new(1000, 250).unwrap();
        assert_eq!(outcome.ratio(), 4.0);
        assert_eq!(outcome.savings_percent(), 75.0);

        let grown = CompressionOutcome::new(100, 200).unwrap();
        assert_eq!(grown.savings_percent(), -100.0);
    }

    #[test]
    fn test_outcome_rejects_zero() {
        assert!(CompressionOutcome::new(100, 0).is_none());
        assert!(CompressionOutcome::new(0, 100).is_none());
    }

    #[test]
    fn test_rgba_upload_to_jpeg_fails_with_encode_error() {
        // Many colors and high complexity: JPEG is planned, alpha is kept
        let rgb = checkerboard_image(224, 224, 2);
        let samples: Vec<u8> = rgb
            .samples()
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect();
        let rgba = PixelBuffer::new(224, 224, ColorMode::Rgba, samples).unwrap();

        let err = processor().compress(&encode_png(&rgba)).unwrap_err();
        assert!(matches!(err, PipelineError::Encode { stage: Stage::Encode, .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_learned_model_requires_caption_model() {
        let mut config = PipelineConfig::default();
        config.semantics.model = SemanticModelKind::Learned;
        assert!(matches!(
            Processor::new(config),
            Err(ConfigError::MissingCaptionModel)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.analysis.size = 0;
        assert!(Processor::new(config).is_err());
    }

    #[test]
    fn test_too_many_dominant_colors_rejected() {
        let mut config = PipelineConfig::default();
        config.analysis.dominant_colors = 12;
        assert!(matches!(
            Processor::new(config),
            Err(ConfigError::DominantColorsOutOfRange { value: 12, max: 5 })
        ));
    }

    struct EchoModel;

    impl CaptionModel for EchoModel {
        fn caption(&self, image: &PixelBuffer) -> Result<ModelCaption, AnalysisError> {
            Ok(ModelCaption {
                description: format!("a {}x{} portrait", image.width(), image.height()),
                confidence: 0.5,
            })
        }
    }

    struct BrokenModel;

    impl CaptionModel for BrokenModel {
        fn caption(&self, _image: &PixelBuffer) -> Result<ModelCaption, AnalysisError> {
            Ok(ModelCaption {
                description: "x".into(),
                confidence: 3.0,
            })
        }
    }

    fn learned_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.semantics.model = SemanticModelKind::Learned;
        config
    }

    #[test]
    fn test_learned_model_sees_analysis_image() {
        let p = Processor::with_caption_model(learned_config(), Arc::new(EchoModel)).unwrap();
        assert_eq!(p.semantic_model(), "learned");

        let analysis = p.analyze(&encode_png(&solid_image(50, 30, [200, 200, 200]))).unwrap();
        assert_eq!(analysis.semantics.description, "a 224x224 portrait");
        assert_eq!(analysis.semantics.confidence, 0.5);
        // Description mentions a portrait, so the planner adds a region
        assert_eq!(analysis.settings.priority_regions.len(), 1);
    }

    #[test]
    fn test_invalid_model_confidence_is_analysis_error() {
        let p = Processor::with_caption_model(learned_config(), Arc::new(BrokenModel)).unwrap();
        let err = p.analyze(&encode_png(&solid_image(8, 8, [0, 0, 0]))).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Analysis {
                stage: Stage::Classify,
                source: AnalysisError::InvalidConfidence(_)
            }
        ));
    }
}
