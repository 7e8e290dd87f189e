//! Collation strategy selection.
//!
//! The (feature type, label layout) pair is fixed for a whole training run,
//! so it is resolved once into a [`CollateStrategy`] value up front; the
//! per-batch path dispatches on that value without touching configuration
//! strings again.

use crate::collate::{
    collate_dense_full, collate_dense_shortlist, collate_sparse_full, collate_sparse_shortlist,
};
use tracing::instrument;
use xmc_collate_core::{Batch, BatchFeatures, CollateError, Example, FeatureType};

/// A collation strategy resolved from run configuration.
///
/// The full-label variants carry a `partitioned` flag derived from the
/// number of label-space partitions. It is bookkeeping for downstream
/// consumers and does not change how matrices are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollateStrategy {
    DenseFull { partitioned: bool },
    DenseShortlist,
    SparseFull { partitioned: bool },
    SparseShortlist,
}

impl CollateStrategy {
    /// Resolve a strategy from typed configuration.
    ///
    /// `num_partitions` must be at least 1; 1 means the label space is not
    /// partitioned. The shortlist strategies accept the value and ignore it.
    pub fn new(
        feature_type: FeatureType,
        use_shortlist: bool,
        num_partitions: usize,
    ) -> Result<Self, CollateError> {
        if num_partitions == 0 {
            return Err(CollateError::InvalidConfiguration(
                "num_partitions must be at least 1".to_string(),
            ));
        }
        let partitioned = num_partitions > 1;

        let strategy = match (feature_type, use_shortlist) {
            (FeatureType::Dense, false) => CollateStrategy::DenseFull { partitioned },
            (FeatureType::Dense, true) => CollateStrategy::DenseShortlist,
            (FeatureType::Sparse, false) => CollateStrategy::SparseFull { partitioned },
            (FeatureType::Sparse, true) => CollateStrategy::SparseShortlist,
        };
        Ok(strategy)
    }

    /// Collate one sampled batch of examples into training matrices.
    #[instrument(skip_all)]
    pub fn collate(&self, batch: &[Example]) -> Result<Batch, CollateError> {
        let collated = match self {
            CollateStrategy::DenseFull { partitioned } => collate_dense_full(batch, *partitioned),
            CollateStrategy::DenseShortlist => collate_dense_shortlist(batch),
            CollateStrategy::SparseFull { partitioned } => collate_sparse_full(batch, *partitioned),
            CollateStrategy::SparseShortlist => collate_sparse_shortlist(batch),
        }
        .map_err(|err| {
            let counter = metrics::counter!("xc_collate_failure", "err" => failure_label(&err));
            counter.increment(1);
            tracing::error!("{err}");
            err
        })?;

        let histogram = metrics::histogram!("xc_collate_batch_size");
        histogram.record(collated.batch_size as f64);
        if let BatchFeatures::Sparse { ids, .. } = &collated.features {
            let histogram = metrics::histogram!("xc_collate_max_length");
            histogram.record(ids.ncols() as f64);
        }

        Ok(collated)
    }
}

/// Resolve the collation strategy for a training run from its string
/// configuration.
///
/// `feature_type` must be `"dense"` or `"sparse"` (case insensitive);
/// anything else is rejected rather than silently mapped to a default.
pub fn construct_collate_fn(
    feature_type: &str,
    use_shortlist: bool,
    num_partitions: usize,
) -> Result<CollateStrategy, CollateError> {
    let feature_type = feature_type.parse::<FeatureType>()?;
    tracing::info!(
        "Using {feature_type} features with {} labels",
        if use_shortlist { "shortlist" } else { "full" }
    );
    CollateStrategy::new(feature_type, use_shortlist, num_partitions)
}

fn failure_label(err: &CollateError) -> &'static str {
    match err {
        CollateError::InvalidConfiguration(_) => "config",
        CollateError::ShapeMismatch(_) => "shape",
        CollateError::EmptyBatch => "empty",
        CollateError::EncodingMismatch(_) => "encoding",
    }
}
