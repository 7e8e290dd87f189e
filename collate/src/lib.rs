//! Mini-batch collation for extreme multi-label classifiers.
//!
//! Turns the variable-length records a dataset yields into the fixed-shape,
//! zero-padded matrices a training loop consumes.

pub mod collate;
pub mod strategy;

pub use strategy::{construct_collate_fn, CollateStrategy};
pub use xmc_collate_core::{
    Batch, BatchFeatures, BatchLabels, CollateError, Example, FeatureType, InputEncoding,
    LabelEncoding,
};
