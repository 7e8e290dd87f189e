#[cfg(feature = "clap")]
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod batch;
pub mod encoding;

pub use batch::{Batch, BatchFeatures, BatchLabels};
pub use encoding::{Example, InputEncoding, LabelEncoding};

/// Feature representation produced by the upstream feature pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
pub enum FeatureType {
    /// Fixed-length embedding vectors, one per example
    Dense,
    /// Variable-length (token id, token weight) sequences
    Sparse,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureType::Dense => write!(f, "dense"),
            FeatureType::Sparse => write!(f, "sparse"),
        }
    }
}

impl std::str::FromStr for FeatureType {
    type Err = CollateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dense" => Ok(Self::Dense),
            "sparse" => Ok(Self::Sparse),
            _ => Err(CollateError::InvalidConfiguration(format!(
                "Invalid feature type: {s}. Valid values: dense, sparse"
            ))),
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum CollateError {
    #[error("Invalid collation configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Cannot collate an empty batch")]
    EmptyBatch,
    #[error("Encoding mismatch: {0}")]
    EncodingMismatch(String),
}
