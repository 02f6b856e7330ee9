//! Selic Core - Content-adaptive image compression
//!
//! This crate inspects an uploaded image (brightness, edge complexity,
//! dominant colors), classifies it, and derives per-image encoder settings
//! before producing a JPEG or WebP.
//!
//! ## Pipeline
//! 1. Decode ([`decode`])
//! 2. Statistics ([`statistics`])
//! 3. Semantic classification ([`semantics`])
//! 4. Planning ([`planner`])
//! 5. Preprocessing ([`preprocess`])
//! 6. Encoding ([`encode`])
//! 7. Summary and suggestions ([`pipeline`], [`suggestions`])
//!
//! [`Processor`] runs the whole sequence; [`api`] wraps it in validated
//! request/response types.

pub mod adjustments;
pub mod api;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod histogram;
pub mod luminance;
pub mod pipeline;
pub mod planner;
pub mod preprocess;
pub mod semantics;
pub mod statistics;
pub mod suggestions;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{handle_analyze, handle_compress, handle_process, ErrorResponse, ImageUpload};
pub use config::{ConfigError, PipelineConfig};
pub use error::{ErrorCategory, InvalidInputError, PipelineError, Stage};
pub use pipeline::{Analysis, CompressedImage, CompressionOutcome, ProcessedImage, Processor};
pub use planner::{CompressionSettings, OptimizationLevel, OutputFormat, Quality};
pub use semantics::{CaptionModel, ModelCaption, SemanticModel, SemanticResult};
pub use statistics::ImageStatistics;
