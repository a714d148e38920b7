use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::batch::LoaderConfig;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Settings for one pipeline run, read from JSON:
///
/// ```json
/// {
///   "data_dir": "data",
///   "dataset": "iris",
///   "split_ratio": 0.8,
///   "seed": 42,
///   "loader": { "batch_size": 16, "shuffle": true, "worker_count": 2 }
/// }
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root holding one directory per dataset.
    pub data_dir: PathBuf,
    /// Dataset directory name under `data_dir`.
    pub dataset: String,
    /// Fraction of records assigned to the training split.
    pub split_ratio: f64,
    /// Seed for the train/test split.
    pub seed: Option<u64>,
    /// Write the bundled Iris tables when `dataset` is `"iris"` and they are missing.
    pub export_if_missing: bool,
    pub loader: LoaderConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dataset: crate::iris::DATASET_NAME.to_string(),
            split_ratio: 0.8,
            seed: None,
            export_if_missing: true,
            loader: LoaderConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing JSON")
    }

    /// Directory holding `data.csv` and `targets.csv`.
    pub fn dataset_dir(&self) -> PathBuf {
        self.data_dir.join(&self.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(RunConfig::from_json("{}").unwrap(), RunConfig::default());
    }

    #[test]
    fn nested_loader_settings() {
        let cfg = RunConfig::from_json(
            r#"{
                "data_dir": "/tmp/x",
                "split_ratio": 0.5,
                "loader": {"batch_size": 4, "shuffle": false}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.dataset_dir(), PathBuf::from("/tmp/x/iris"));
        assert_eq!(cfg.split_ratio, 0.5);
        assert_eq!(cfg.loader.batch_size, 4);
        assert!(!cfg.loader.shuffle);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunConfig::from_path(Path::new("/nonexistent/run.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/run.json"));
    }
}
