use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::batch::{DataLoader, LoaderConfig};
use crate::config::RunConfig;
use crate::data::model::{FEATURES_FILE, TARGETS_FILE};
use crate::data::{train_test_split, Dataset, Subset, TabularDataset};
use crate::iris;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// A loaded dataset and its train/test views.
pub struct Session {
    pub dataset: Arc<TabularDataset>,
    pub train: Subset<TabularDataset>,
    pub test: Subset<TabularDataset>,
}

/// What one epoch over a subset produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpochSummary {
    pub batches: usize,
    pub records: usize,
    /// Records seen per label code.
    pub label_counts: BTreeMap<i64, usize>,
}

impl Session {
    /// Open the configured dataset (exporting Iris first if allowed) and split it.
    pub fn open(config: &RunConfig) -> Result<Self> {
        let dir = config.dataset_dir();
        let present = dir.join(FEATURES_FILE).is_file() && dir.join(TARGETS_FILE).is_file();

        if !present && config.export_if_missing && config.dataset == iris::DATASET_NAME {
            log::warn!("{} missing, exporting bundled iris tables", dir.display());
            iris::export(&config.data_dir).context("exporting iris tables")?;
        }

        let dataset = TabularDataset::open_dir(&dir)
            .with_context(|| format!("opening dataset in {}", dir.display()))?;
        log::info!(
            "loaded {} records with {} features from {}",
            dataset.len(),
            dataset.feature_width(),
            dir.display()
        );

        let dataset = Arc::new(dataset);
        let (train, test) =
            train_test_split(Arc::clone(&dataset), config.split_ratio, config.seed)?;
        Ok(Session {
            dataset,
            train,
            test,
        })
    }

    /// Iterate one epoch over `subset` and tally what came out.
    pub fn run_epoch(
        subset: &Subset<TabularDataset>,
        config: &LoaderConfig,
    ) -> Result<EpochSummary> {
        let mut loader = DataLoader::new(Arc::new(subset.clone()), config.clone())?;
        let mut summary = EpochSummary::default();
        if loader.is_empty() {
            log::warn!("epoch over an empty subset");
            return Ok(summary);
        }
        log::debug!(
            "epoch over {} records in {} batches",
            loader.len(),
            loader.num_batches()
        );

        for batch in loader.iter() {
            let batch = batch?;
            summary.batches += 1;
            summary.records += batch.len();
            for label in &batch.labels {
                *summary.label_counts.entry(*label).or_default() += 1;
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_and_splits_iris() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            data_dir: dir.path().to_path_buf(),
            seed: Some(1),
            ..RunConfig::default()
        };

        let session = Session::open(&config).unwrap();
        assert!(dir.path().join("iris").join("data.csv").is_file());
        assert_eq!(session.dataset.len(), 150);
        assert_eq!((session.train.len(), session.test.len()), (120, 30));

        let loader = LoaderConfig::default().batch_size(16).seed(9);
        let summary = Session::run_epoch(&session.train, &loader).unwrap();
        assert_eq!(summary.batches, 8);
        assert_eq!(summary.records, 120);
        assert_eq!(summary.label_counts.values().sum::<usize>(), 120);
    }

    #[test]
    fn empty_subset_runs_no_batches() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            data_dir: dir.path().to_path_buf(),
            split_ratio: 1.0,
            ..RunConfig::default()
        };

        let session = Session::open(&config).unwrap();
        assert!(session.test.is_empty());
        let summary = Session::run_epoch(&session.test, &config.loader).unwrap();
        assert_eq!(summary, EpochSummary::default());
    }

    #[test]
    fn missing_non_iris_dataset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            data_dir: dir.path().to_path_buf(),
            dataset: "wine".into(),
            ..RunConfig::default()
        };
        assert!(Session::open(&config).is_err());
    }
}
