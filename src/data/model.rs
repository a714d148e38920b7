use std::path::Path;

use crate::error::{DatasetError, Result};

use super::loader;

/// File holding the feature table inside a dataset directory.
pub const FEATURES_FILE: &str = "data.csv";
/// File holding the label table inside a dataset directory.
pub const TARGETS_FILE: &str = "targets.csv";

// ---------------------------------------------------------------------------
// Dataset – positional, read-only access to records
// ---------------------------------------------------------------------------

/// One (feature vector, label) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub features: Vec<f64>,
    pub label: i64,
}

/// An indexed collection of records.
///
/// Implementations hold no mutable state, so `get` may be called from
/// several loader workers at once.
pub trait Dataset: Send + Sync {
    /// Number of records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record at `index`, or [`DatasetError::Index`] past the end.
    fn get(&self, index: usize) -> Result<Record>;

    /// Length of every feature vector returned by `get`.
    fn feature_width(&self) -> usize;
}

// ---------------------------------------------------------------------------
// FeatureTable – one fixed-width numeric row per sample
// ---------------------------------------------------------------------------

/// Feature rows stored row-major with a declared width.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    values: Vec<f64>,
    rows: usize,
}

impl FeatureTable {
    /// Build a table from column names and rows; every row must have one
    /// value per column.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let width = columns.len();
        let mut values = Vec::with_capacity(rows.len() * width);
        for (row, r) in rows.iter().enumerate() {
            if r.len() != width {
                return Err(DatasetError::RaggedRow {
                    row,
                    expected: width,
                    found: r.len(),
                });
            }
            values.extend_from_slice(r);
        }
        Ok(FeatureTable {
            columns,
            values,
            rows: rows.len(),
        })
    }

    /// Build from an already flattened row-major buffer.
    pub(crate) fn from_flat(columns: Vec<String>, values: Vec<f64>) -> Self {
        let width = columns.len();
        let rows = if width == 0 { 0 } else { values.len() / width };
        FeatureTable {
            columns,
            values,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// The feature row at `index`.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.rows {
            return None;
        }
        let w = self.width();
        Some(&self.values[index * w..(index + 1) * w])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).filter_map(move |i| self.row(i))
    }
}

// ---------------------------------------------------------------------------
// LabelTable – one integer class code per sample
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    column: String,
    labels: Vec<i64>,
}

impl LabelTable {
    pub fn new(column: impl Into<String>, labels: Vec<i64>) -> Self {
        LabelTable {
            column: column.into(),
            labels,
        }
    }

    /// Name of the label column.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TabularDataset – feature and label tables paired by row
// ---------------------------------------------------------------------------

/// Feature and label tables paired by row index, read-only after load.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    features: FeatureTable,
    labels: LabelTable,
}

impl TabularDataset {
    /// Pair two tables. Fails with [`DatasetError::Consistency`] when their
    /// row counts differ; nothing is truncated.
    pub fn new(features: FeatureTable, labels: LabelTable) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(DatasetError::Consistency {
                features: features.len(),
                labels: labels.len(),
            });
        }
        Ok(TabularDataset { features, labels })
    }

    /// Load a feature table and a label table from two files.
    /// The format of each is chosen by its extension (`.csv` or `.parquet`).
    pub fn open(features_path: &Path, labels_path: &Path) -> Result<Self> {
        let features = loader::load_features(features_path)?;
        let labels = loader::load_labels(labels_path)?;
        log::debug!(
            "loaded {} x {} features from {} and {} labels from {}",
            features.len(),
            features.width(),
            features_path.display(),
            labels.len(),
            labels_path.display()
        );
        Self::new(features, labels)
    }

    /// Load `data.csv` and `targets.csv` from a dataset directory.
    pub fn open_dir(dir: &Path) -> Result<Self> {
        Self::open(&dir.join(FEATURES_FILE), &dir.join(TARGETS_FILE))
    }

    /// Write both tables into `dir` as `data.csv` and `targets.csv`,
    /// creating the directory if absent.
    pub fn save_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| DatasetError::write(dir, e))?;
        loader::write_features_csv(&self.features, &dir.join(FEATURES_FILE))?;
        loader::write_labels_csv(&self.labels, &dir.join(TARGETS_FILE))?;
        Ok(())
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }
}

impl Dataset for TabularDataset {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn get(&self, index: usize) -> Result<Record> {
        let features = self.features.row(index).ok_or(DatasetError::Index {
            index,
            size: self.len(),
        })?;
        Ok(Record {
            features: features.to_vec(),
            label: self.labels.labels[index],
        })
    }

    fn feature_width(&self) -> usize {
        self.features.width()
    }
}
