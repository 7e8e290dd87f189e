use ndarray::array;
use xmc_collate::{
    construct_collate_fn, Batch, BatchFeatures, BatchLabels, CollateError, Example, InputEncoding,
};

#[test]
fn test_dense_full_batch() {
    let collate_fn = construct_collate_fn("dense", false, 1).unwrap();
    let batch = vec![
        Example::new(vec![1.0, 2.0].into(), vec![0.0, 1.0, 0.0].into()),
        Example::new(vec![3.0, 4.0].into(), vec![1.0, 0.0, 0.0].into()),
    ];

    let collated = collate_fn.collate(&batch).unwrap();

    assert_eq!(
        collated,
        Batch {
            features: BatchFeatures::Dense(array![[1.0, 2.0], [3.0, 4.0]]),
            labels: BatchLabels::Full(array![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]),
            batch_size: 2,
        }
    );
}

#[test]
fn test_sparse_full_batch_pads_to_batch_maximum() {
    let collate_fn = construct_collate_fn("sparse", false, 1).unwrap();
    let batch = vec![
        Example::new(
            InputEncoding::sparse(vec![3, 7, 9], vec![0.1, 0.9, 0.4]).unwrap(),
            vec![0.0, 1.0].into(),
        ),
        Example::new(
            InputEncoding::sparse(vec![5], vec![0.5]).unwrap(),
            vec![1.0, 0.0].into(),
        ),
    ];

    let collated = collate_fn.collate(&batch).unwrap();

    assert_eq!(
        collated.features,
        BatchFeatures::Sparse {
            ids: array![[3, 7, 9], [5, 0, 0]],
            weights: array![[0.1, 0.9, 0.4], [0.5, 0.0, 0.0]],
        }
    );
    assert_eq!(
        collated.labels,
        BatchLabels::Full(array![[0.0, 1.0], [1.0, 0.0]])
    );
    assert_eq!(collated.batch_size, 2);
}

#[test]
fn test_max_length_is_batch_local() {
    // Consecutive batches from one strategy pad to their own maxima, not to
    // a global or sticky width
    let collate_fn = construct_collate_fn("sparse", false, 1).unwrap();

    let wide = vec![
        Example::new(
            InputEncoding::sparse(vec![1, 2, 3], vec![0.1, 0.2, 0.3]).unwrap(),
            vec![1.0].into(),
        ),
        Example::new(
            InputEncoding::sparse(vec![4], vec![0.4]).unwrap(),
            vec![0.0].into(),
        ),
    ];
    let narrow = vec![Example::new(
        InputEncoding::sparse(vec![8], vec![0.8]).unwrap(),
        vec![1.0].into(),
    )];

    let wide_batch = collate_fn.collate(&wide).unwrap();
    let narrow_batch = collate_fn.collate(&narrow).unwrap();

    let BatchFeatures::Sparse { ids, .. } = wide_batch.features else {
        panic!("expected sparse features");
    };
    assert_eq!(ids.dim(), (2, 3));

    let BatchFeatures::Sparse { ids, .. } = narrow_batch.features else {
        panic!("expected sparse features");
    };
    assert_eq!(ids.dim(), (1, 1));
}

#[test]
fn test_partitioned_run_emits_identical_matrices() {
    // num_partitions > 1 marks the run as partitioned but never changes
    // the collated output
    let batch = vec![Example::new(
        InputEncoding::sparse(vec![3, 7], vec![0.1, 0.9]).unwrap(),
        vec![0.0, 1.0, 0.0].into(),
    )];

    let plain = construct_collate_fn("sparse", false, 1)
        .unwrap()
        .collate(&batch)
        .unwrap();
    let partitioned = construct_collate_fn("sparse", false, 4)
        .unwrap()
        .collate(&batch)
        .unwrap();

    assert_eq!(plain, partitioned);
}

#[test]
fn test_serialized_batch_keys() {
    let collate_fn = construct_collate_fn("dense", false, 1).unwrap();
    let batch = vec![Example::new(vec![1.0, 2.0].into(), vec![0.0, 1.0].into())];
    let collated = collate_fn.collate(&batch).unwrap();

    let value = serde_json::to_value(&collated).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), ["X", "Y", "batch_size"]);
    assert_eq!(value["batch_size"], serde_json::json!(1));

    let collate_fn = construct_collate_fn("sparse", false, 1).unwrap();
    let batch = vec![Example::new(
        InputEncoding::sparse(vec![3], vec![0.5]).unwrap(),
        vec![0.0, 1.0].into(),
    )];
    let collated = collate_fn.collate(&batch).unwrap();

    let value = serde_json::to_value(&collated).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(
        object.keys().collect::<Vec<_>>(),
        ["X", "X_w", "Y", "batch_size"]
    );
}

#[test]
fn test_empty_batch_is_rejected() {
    let collate_fn = construct_collate_fn("dense", false, 1).unwrap();
    let result = collate_fn.collate(&[]);
    assert!(matches!(result, Err(CollateError::EmptyBatch)));
}

#[test]
fn test_ragged_dense_rows_are_rejected() {
    let collate_fn = construct_collate_fn("dense", false, 1).unwrap();
    let batch = vec![
        Example::new(vec![1.0, 2.0].into(), vec![0.0].into()),
        Example::new(vec![3.0].into(), vec![1.0].into()),
    ];

    let result = collate_fn.collate(&batch);

    assert!(matches!(result, Err(CollateError::ShapeMismatch(_))));
    assert!(result.unwrap_err().to_string().contains("row 1"));
}

#[test]
fn test_ragged_label_rows_are_rejected() {
    let collate_fn = construct_collate_fn("dense", false, 1).unwrap();
    let batch = vec![
        Example::new(vec![1.0].into(), vec![0.0, 1.0].into()),
        Example::new(vec![2.0].into(), vec![1.0].into()),
    ];

    let result = collate_fn.collate(&batch);

    assert!(matches!(result, Err(CollateError::ShapeMismatch(_))));
}
