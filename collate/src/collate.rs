//! Batch construction: ragged example records in, fixed-shape matrices out.
//!
//! All matrices are row major with one example per row. Sparse features are
//! right padded to the longest sequence of the batch at hand, so matrix
//! widths vary from batch to batch.

use ndarray::Array2;
use xmc_collate_core::{
    Batch, BatchFeatures, BatchLabels, CollateError, Example, InputEncoding, LabelEncoding,
};

/// Pad ragged (ids, weights) rows into two aligned `(batch_size, max_length)`
/// matrices.
///
/// `max_length` is the longest row of this call. Shorter rows are zero filled
/// on the right in both matrices, which makes a padded cell indistinguishable
/// from a real token with id 0 and weight 0.0; feature pipelines reserve id 0
/// as a padding index for that reason.
pub fn pad_sparse_features(
    rows: &[(&[i64], &[f32])],
) -> Result<(Array2<i64>, Array2<f32>), CollateError> {
    if rows.is_empty() {
        return Err(CollateError::EmptyBatch);
    }

    let batch_size = rows.len();
    let max_length = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0);
    let elems = batch_size * max_length;

    let mut ids = Vec::with_capacity(elems);
    let mut weights = Vec::with_capacity(elems);

    for (row, (row_ids, row_weights)) in rows.iter().enumerate() {
        if row_ids.len() != row_weights.len() {
            return Err(CollateError::ShapeMismatch(format!(
                "row {row}: {} ids but {} weights",
                row_ids.len(),
                row_weights.len()
            )));
        }

        // Copy values
        ids.extend_from_slice(row_ids);
        weights.extend_from_slice(row_weights);

        // Add padding if needed
        let padding = max_length - row_ids.len();
        if padding > 0 {
            for _ in 0..padding {
                ids.push(0);
                weights.push(0.0);
            }
        }
    }

    let ids = Array2::from_shape_vec((batch_size, max_length), ids).e()?;
    let weights = Array2::from_shape_vec((batch_size, max_length), weights).e()?;
    Ok((ids, weights))
}

/// Row-stack fixed-length feature vectors into one `(batch_size, dims)`
/// matrix.
///
/// `dims` is read from the first row; every later row must match it.
pub fn stack_dense_features(rows: &[&[f32]]) -> Result<Array2<f32>, CollateError> {
    if rows.is_empty() {
        return Err(CollateError::EmptyBatch);
    }

    let batch_size = rows.len();
    let dims = rows[0].len();
    let mut values = Vec::with_capacity(batch_size * dims);

    for (row, row_values) in rows.iter().enumerate() {
        if row_values.len() != dims {
            return Err(CollateError::ShapeMismatch(format!(
                "row {row}: expected {dims} features, got {}",
                row_values.len()
            )));
        }
        values.extend_from_slice(row_values);
    }

    Array2::from_shape_vec((batch_size, dims), values).e()
}

/// Row-stack ground-truth vectors over the complete label space into one
/// `(batch_size, labels)` matrix.
pub fn stack_full_labels(rows: &[&[f32]]) -> Result<Array2<f32>, CollateError> {
    if rows.is_empty() {
        return Err(CollateError::EmptyBatch);
    }

    let batch_size = rows.len();
    let labels = rows[0].len();
    let mut values = Vec::with_capacity(batch_size * labels);

    for (row, row_values) in rows.iter().enumerate() {
        if row_values.len() != labels {
            return Err(CollateError::ShapeMismatch(format!(
                "row {row}: expected {labels} labels, got {}",
                row_values.len()
            )));
        }
        values.extend_from_slice(row_values);
    }

    Array2::from_shape_vec((batch_size, labels), values).e()
}

/// Pack shortlist triples into three aligned `(batch_size, shortlist_size)`
/// matrices: candidate ids, relevance and distances.
///
/// Shortlists are sized upstream, so no padding happens here: the size is
/// read from the first row and every later row must match it exactly.
pub fn pack_shortlist_labels(
    rows: &[(&[i64], &[f32], &[f32])],
) -> Result<(Array2<i64>, Array2<f32>, Array2<f32>), CollateError> {
    if rows.is_empty() {
        return Err(CollateError::EmptyBatch);
    }

    let batch_size = rows.len();
    let shortlist_size = rows[0].0.len();
    let elems = batch_size * shortlist_size;

    let mut ids = Vec::with_capacity(elems);
    let mut relevance = Vec::with_capacity(elems);
    let mut distance = Vec::with_capacity(elems);

    for (row, (row_ids, row_relevance, row_distance)) in rows.iter().enumerate() {
        if row_ids.len() != shortlist_size
            || row_relevance.len() != shortlist_size
            || row_distance.len() != shortlist_size
        {
            return Err(CollateError::ShapeMismatch(format!(
                "row {row}: expected shortlists of size {shortlist_size}, got ({}, {}, {})",
                row_ids.len(),
                row_relevance.len(),
                row_distance.len()
            )));
        }

        ids.extend_from_slice(row_ids);
        relevance.extend_from_slice(row_relevance);
        distance.extend_from_slice(row_distance);
    }

    let ids = Array2::from_shape_vec((batch_size, shortlist_size), ids).e()?;
    let relevance = Array2::from_shape_vec((batch_size, shortlist_size), relevance).e()?;
    let distance = Array2::from_shape_vec((batch_size, shortlist_size), distance).e()?;
    Ok((ids, relevance, distance))
}

/// Collate dense features with ground truth over the complete label space.
///
/// `partitioned` records whether the label space is split across partitions;
/// stacking is identical either way.
pub fn collate_dense_full(batch: &[Example], partitioned: bool) -> Result<Batch, CollateError> {
    if batch.is_empty() {
        return Err(CollateError::EmptyBatch);
    }

    let mut features = Vec::with_capacity(batch.len());
    let mut labels = Vec::with_capacity(batch.len());
    for (row, example) in batch.iter().enumerate() {
        let InputEncoding::Dense(values) = &example.input else {
            return Err(CollateError::EncodingMismatch(format!(
                "row {row}: expected dense features, got sparse"
            )));
        };
        let LabelEncoding::Full(targets) = &example.labels else {
            return Err(CollateError::EncodingMismatch(format!(
                "row {row}: expected full labels, got a shortlist"
            )));
        };
        features.push(values.as_slice());
        labels.push(targets.as_slice());
    }

    let x = stack_dense_features(&features)?;
    let y = stack_full_labels(&labels)?;
    tracing::trace!(
        "collated {} dense rows (partitioned: {partitioned})",
        batch.len()
    );

    Ok(Batch {
        features: BatchFeatures::Dense(x),
        labels: BatchLabels::Full(y),
        batch_size: batch.len(),
    })
}

/// Collate dense features with shortlisted labels.
pub fn collate_dense_shortlist(batch: &[Example]) -> Result<Batch, CollateError> {
    if batch.is_empty() {
        return Err(CollateError::EmptyBatch);
    }

    let mut features = Vec::with_capacity(batch.len());
    let mut shortlists = Vec::with_capacity(batch.len());
    for (row, example) in batch.iter().enumerate() {
        let InputEncoding::Dense(values) = &example.input else {
            return Err(CollateError::EncodingMismatch(format!(
                "row {row}: expected dense features, got sparse"
            )));
        };
        let LabelEncoding::Shortlist {
            ids,
            relevance,
            distance,
        } = &example.labels
        else {
            return Err(CollateError::EncodingMismatch(format!(
                "row {row}: expected shortlist labels, got a full vector"
            )));
        };
        features.push(values.as_slice());
        shortlists.push((ids.as_slice(), relevance.as_slice(), distance.as_slice()));
    }

    let x = stack_dense_features(&features)?;
    let (ids, relevance, distance) = pack_shortlist_labels(&shortlists)?;

    Ok(Batch {
        features: BatchFeatures::Dense(x),
        labels: BatchLabels::Shortlist {
            ids,
            relevance,
            distance,
        },
        batch_size: batch.len(),
    })
}

/// Collate sparse features with ground truth over the complete label space.
///
/// `partitioned` records whether the label space is split across partitions;
/// stacking is identical either way.
pub fn collate_sparse_full(batch: &[Example], partitioned: bool) -> Result<Batch, CollateError> {
    if batch.is_empty() {
        return Err(CollateError::EmptyBatch);
    }

    let mut features = Vec::with_capacity(batch.len());
    let mut labels = Vec::with_capacity(batch.len());
    for (row, example) in batch.iter().enumerate() {
        let InputEncoding::Sparse { ids, weights } = &example.input else {
            return Err(CollateError::EncodingMismatch(format!(
                "row {row}: expected sparse features, got dense"
            )));
        };
        let LabelEncoding::Full(targets) = &example.labels else {
            return Err(CollateError::EncodingMismatch(format!(
                "row {row}: expected full labels, got a shortlist"
            )));
        };
        features.push((ids.as_slice(), weights.as_slice()));
        labels.push(targets.as_slice());
    }

    let (ids, weights) = pad_sparse_features(&features)?;
    let y = stack_full_labels(&labels)?;
    tracing::trace!(
        "collated {} sparse rows to width {} (partitioned: {partitioned})",
        batch.len(),
        ids.ncols()
    );

    Ok(Batch {
        features: BatchFeatures::Sparse { ids, weights },
        labels: BatchLabels::Full(y),
        batch_size: batch.len(),
    })
}

/// Collate sparse features with shortlisted labels.
pub fn collate_sparse_shortlist(batch: &[Example]) -> Result<Batch, CollateError> {
    if batch.is_empty() {
        return Err(CollateError::EmptyBatch);
    }

    let mut features = Vec::with_capacity(batch.len());
    let mut shortlists = Vec::with_capacity(batch.len());
    for (row, example) in batch.iter().enumerate() {
        let InputEncoding::Sparse { ids, weights } = &example.input else {
            return Err(CollateError::EncodingMismatch(format!(
                "row {row}: expected sparse features, got dense"
            )));
        };
        let LabelEncoding::Shortlist {
            ids: candidates,
            relevance,
            distance,
        } = &example.labels
        else {
            return Err(CollateError::EncodingMismatch(format!(
                "row {row}: expected shortlist labels, got a full vector"
            )));
        };
        features.push((ids.as_slice(), weights.as_slice()));
        shortlists.push((
            candidates.as_slice(),
            relevance.as_slice(),
            distance.as_slice(),
        ));
    }

    let (ids, weights) = pad_sparse_features(&features)?;
    let (candidates, relevance, distance) = pack_shortlist_labels(&shortlists)?;

    Ok(Batch {
        features: BatchFeatures::Sparse { ids, weights },
        labels: BatchLabels::Shortlist {
            ids: candidates,
            relevance,
            distance,
        },
        batch_size: batch.len(),
    })
}

trait WrapErr<O> {
    fn e(self) -> Result<O, CollateError>;
}

impl<O> WrapErr<O> for Result<O, ndarray::ShapeError> {
    fn e(self) -> Result<O, CollateError> {
        self.map_err(|e| CollateError::ShapeMismatch(e.to_string()))
    }
}
