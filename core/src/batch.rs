use ndarray::Array2;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Feature matrices of a collated batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchFeatures {
    /// `X`: row-stacked feature vectors, shape `(batch_size, dims)`
    Dense(Array2<f32>),
    /// `X` and `X_w`: token ids and weights, both `(batch_size, max_length)`
    /// where `max_length` is the longest sequence of this batch. Rows
    /// shorter than `max_length` are zero padded on the right in both
    /// matrices.
    Sparse {
        ids: Array2<i64>,
        weights: Array2<f32>,
    },
}

/// Label matrices of a collated batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchLabels {
    /// `Y`: ground-truth matrix over the complete label space, shape
    /// `(batch_size, labels)`
    Full(Array2<f32>),
    /// `Y_s`, `Y` and `Y_d`: candidate ids, relevance and distances, each
    /// `(batch_size, shortlist_size)`. `Y` carries relevance here; the
    /// name is shared with the full layout so downstream consumers read
    /// their targets from one key.
    Shortlist {
        ids: Array2<i64>,
        relevance: Array2<f32>,
        distance: Array2<f32>,
    },
}

/// One collated mini-batch, ready to hand to the training loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub features: BatchFeatures,
    pub labels: BatchLabels,
    pub batch_size: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.batch_size == 0
    }
}

impl Serialize for Batch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        match &self.features {
            BatchFeatures::Dense(x) => map.serialize_entry("X", x)?,
            BatchFeatures::Sparse { ids, weights } => {
                map.serialize_entry("X", ids)?;
                map.serialize_entry("X_w", weights)?;
            }
        }
        match &self.labels {
            BatchLabels::Full(y) => map.serialize_entry("Y", y)?,
            BatchLabels::Shortlist {
                ids,
                relevance,
                distance,
            } => {
                map.serialize_entry("Y_s", ids)?;
                map.serialize_entry("Y", relevance)?;
                map.serialize_entry("Y_d", distance)?;
            }
        }
        map.serialize_entry("batch_size", &self.batch_size)?;
        map.end()
    }
}
