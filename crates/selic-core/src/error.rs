//! Pipeline-level error taxonomy.
//!
//! Stage errors ([`DecodeError`], [`AnalysisError`], [`EncodeError`]) are
//! wrapped together with the stage they came from, so every failure can be
//! logged and reported with its stage name, a client/server category and an
//! HTTP-style status code.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::semantics::AnalysisError;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validate,
    Decode,
    Analyze,
    Classify,
    Encode,
    Summarize,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Decode => "decode",
            Stage::Analyze => "analyze",
            Stage::Classify => "classify",
            Stage::Encode => "encode",
            Stage::Summarize => "summarize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who caused a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Client,
    Server,
}

/// Upload rejected before decoding.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidInputError {
    #[error("File must be an image (got content type \"{0}\")")]
    NotAnImage(String),

    #[error("Upload is empty")]
    EmptyUpload,

    #[error("Upload is {size} bytes, the limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
}

/// Any failure of a pipeline run. Aborts the whole request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    #[error("{stage} failed: {source}")]
    Decode {
        stage: Stage,
        #[source]
        source: DecodeError,
    },

    #[error("{stage} failed: {source}")]
    Analysis {
        stage: Stage,
        #[source]
        source: AnalysisError,
    },

    #[error("{stage} failed: {source}")]
    Encode {
        stage: Stage,
        #[source]
        source: EncodeError,
    },
}

impl PipelineError {
    pub fn decode(stage: Stage, source: DecodeError) -> Self {
        Self::Decode { stage, source }
    }

    pub fn analysis(stage: Stage, source: AnalysisError) -> Self {
        Self::Analysis { stage, source }
    }

    pub fn encode(stage: Stage, source: EncodeError) -> Self {
        Self::Encode { stage, source }
    }

    /// Stage the failure happened in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidInput(_) => Stage::Validate,
            Self::Decode { stage, .. } | Self::Analysis { stage, .. } | Self::Encode { stage, .. } => {
                *stage
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) | Self::Decode { .. } => ErrorCategory::Client,
            Self::Analysis { .. } | Self::Encode { .. } => ErrorCategory::Server,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Decode { .. } => 422,
            Self::Analysis { .. } | Self::Encode { .. } => 500,
        }
    }

    /// Taxonomy name reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInputError",
            Self::Decode { .. } => "DecodeError",
            Self::Analysis { .. } => "AnalysisError",
            Self::Encode { .. } => "EncodeError",
        }
    }
}
