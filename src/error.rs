use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading, indexing, splitting or batching a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A table source is missing, unreadable or malformed.
    #[error("failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// Feature and label tables disagree on the number of rows.
    #[error("row count mismatch: {features} feature rows but {labels} labels")]
    Consistency { features: usize, labels: usize },

    #[error("index {index} out of range for dataset of size {size}")]
    Index { index: usize, size: usize },

    /// An in-memory feature row does not match the table width.
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("split ratio {0} is outside [0, 1]")]
    InvalidRatio(f64),

    #[error("invalid loader configuration: {0}")]
    Config(String),

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl DatasetError {
    pub(crate) fn load(path: &Path, reason: impl ToString) -> Self {
        DatasetError::Load {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, source: impl Into<csv::Error>) -> Self {
        DatasetError::Write {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = DatasetError> = std::result::Result<T, E>;
