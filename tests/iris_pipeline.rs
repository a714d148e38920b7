use std::collections::BTreeSet;
use std::sync::Arc;

use rusty_iris::{
    iris, train_test_split, DataLoader, Dataset, DatasetError, LoaderConfig, TabularDataset,
};

#[test]
fn exported_tables_reopen_as_150_records() {
    let root = tempfile::tempdir().unwrap();
    let dir = iris::export(root.path()).unwrap();
    assert_eq!(dir, root.path().join("iris"));

    let headers = std::fs::read_to_string(dir.join("data.csv")).unwrap();
    let expected = "sepal length (cm),sepal width (cm),petal length (cm),petal width (cm)\n";
    assert!(headers.starts_with(expected));
    let targets = std::fs::read_to_string(dir.join("targets.csv")).unwrap();
    assert!(targets.starts_with("species\n0\n"));

    let ds = TabularDataset::open_dir(&dir).unwrap();
    assert_eq!(ds.len(), 150);
    let first = ds.get(0).unwrap();
    assert_eq!(first.features, vec![5.1, 3.5, 1.4, 0.2]);
    assert_eq!(first.label, 0);

    let labels: BTreeSet<i64> = ds.labels().labels().iter().copied().collect();
    assert_eq!(labels, BTreeSet::from([0, 1, 2]));
    for i in 0..ds.len() {
        assert_eq!(ds.get(i).unwrap().features.len(), 4);
    }
    assert!(matches!(
        ds.get(150),
        Err(DatasetError::Index { index: 150, size: 150 })
    ));
}

#[test]
fn round_trip_preserves_every_record() {
    let (original, _) = iris::load().unwrap();
    let root = tempfile::tempdir().unwrap();
    original.save_dir(&root.path().join("copy")).unwrap();

    let reopened = TabularDataset::open_dir(&root.path().join("copy")).unwrap();
    assert_eq!(reopened.len(), original.len());
    for i in 0..original.len() {
        assert_eq!(reopened.get(i).unwrap(), original.get(i).unwrap());
    }
}

#[test]
fn truncated_targets_are_a_consistency_error() {
    let root = tempfile::tempdir().unwrap();
    let dir = iris::export(root.path()).unwrap();

    let targets = std::fs::read_to_string(dir.join("targets.csv")).unwrap();
    let truncated: Vec<&str> = targets.lines().take(101).collect();
    std::fs::write(dir.join("targets.csv"), truncated.join("\n") + "\n").unwrap();

    let err = TabularDataset::open_dir(&dir).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::Consistency {
            features: 150,
            labels: 100
        }
    ));
}

#[test]
fn split_then_batch_the_training_set() {
    let (ds, _) = iris::load().unwrap();
    let (train, test) = train_test_split(Arc::new(ds), 0.8, Some(0)).unwrap();
    assert_eq!((train.len(), test.len()), (120, 30));

    let cfg = LoaderConfig::default()
        .batch_size(32)
        .seed(5)
        .worker_count(2);
    let mut loader = DataLoader::new(Arc::new(train.clone()), cfg).unwrap();
    let batches: Vec<_> = loader.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(batches.len(), 4);
    assert_eq!(batches.last().map(|b| b.len()), Some(24));
    assert!(batches.iter().all(|b| b.width() == 4));

    // Batch indices are positions within the train subset.
    let seen: BTreeSet<usize> = batches.iter().flat_map(|b| b.indices.clone()).collect();
    assert_eq!(seen, (0..120).collect::<BTreeSet<_>>());
}
