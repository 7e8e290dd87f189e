use crate::CollateError;

/// Feature side of one training example.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEncoding {
    /// Fixed-length feature vector
    Dense(Vec<f32>),
    /// Ragged (token id, token weight) sequence; `ids` and `weights` are
    /// parallel and equally long
    Sparse { ids: Vec<i64>, weights: Vec<f32> },
}

impl InputEncoding {
    /// Build a sparse encoding, checking that ids and weights line up.
    pub fn sparse(ids: Vec<i64>, weights: Vec<f32>) -> Result<Self, CollateError> {
        if ids.len() != weights.len() {
            return Err(CollateError::ShapeMismatch(format!(
                "sparse record has {} ids but {} weights",
                ids.len(),
                weights.len()
            )));
        }
        Ok(Self::Sparse { ids, weights })
    }

    /// Number of stored values: token count for sparse records, vector
    /// length for dense ones.
    pub fn len(&self) -> usize {
        match self {
            Self::Dense(values) => values.len(),
            Self::Sparse { ids, .. } => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f32>> for InputEncoding {
    fn from(values: Vec<f32>) -> Self {
        Self::Dense(values)
    }
}

/// Ground-truth side of one training example.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelEncoding {
    /// Relevance vector over the complete label space
    Full(Vec<f32>),
    /// Candidate shortlist; `ids`, `relevance` and `distance` are parallel
    /// and equally long
    Shortlist {
        ids: Vec<i64>,
        relevance: Vec<f32>,
        distance: Vec<f32>,
    },
}

impl LabelEncoding {
    /// Build a shortlist encoding, checking that all three sequences line up.
    pub fn shortlist(
        ids: Vec<i64>,
        relevance: Vec<f32>,
        distance: Vec<f32>,
    ) -> Result<Self, CollateError> {
        if ids.len() != relevance.len() || ids.len() != distance.len() {
            return Err(CollateError::ShapeMismatch(format!(
                "shortlist record has {} candidates, {} relevance scores and {} distances",
                ids.len(),
                relevance.len(),
                distance.len()
            )));
        }
        Ok(Self::Shortlist {
            ids,
            relevance,
            distance,
        })
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Full(values) => values.len(),
            Self::Shortlist { ids, .. } => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f32>> for LabelEncoding {
    fn from(values: Vec<f32>) -> Self {
        Self::Full(values)
    }
}

/// One training example as handed over by the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub input: InputEncoding,
    pub labels: LabelEncoding,
}

impl Example {
    pub fn new(input: InputEncoding, labels: LabelEncoding) -> Self {
        Self { input, labels }
    }
}
