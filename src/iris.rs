use std::path::{Path, PathBuf};

use crate::data::{FeatureTable, LabelTable, TabularDataset};
use crate::encode::LabelEncoder;
use crate::error::{DatasetError, Result};

/// Fisher's Iris measurements: 150 rows, four features and the species.
const IRIS_CSV: &str = include_str!("../assets/iris.csv");

/// Directory name the tables are exported under.
pub const DATASET_NAME: &str = "iris";

pub const FEATURE_NAMES: [&str; 4] = [
    "sepal length (cm)",
    "sepal width (cm)",
    "petal length (cm)",
    "petal width (cm)",
];

pub const TARGET_NAME: &str = "species";

/// Parse the embedded table into features and raw species names.
pub fn raw() -> Result<(FeatureTable, Vec<String>)> {
    let origin = Path::new("assets/iris.csv");
    let mut reader = csv::Reader::from_reader(IRIS_CSV.as_bytes());

    let mut rows = Vec::new();
    let mut species = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DatasetError::load(origin, e))?;
        if record.len() != FEATURE_NAMES.len() + 1 {
            return Err(DatasetError::load(
                origin,
                format!("row {row_no} has {} fields", record.len()),
            ));
        }
        let features = record
            .iter()
            .take(FEATURE_NAMES.len())
            .map(|cell| {
                cell.parse::<f64>().map_err(|_| {
                    DatasetError::load(origin, format!("row {row_no}: '{cell}' is not a number"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(features);
        species.push(record[FEATURE_NAMES.len()].to_string());
    }

    let columns = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    Ok((FeatureTable::from_rows(columns, rows)?, species))
}

/// The Iris dataset with species encoded as 0, 1, 2, plus the encoder
/// that produced the codes.
pub fn load() -> Result<(TabularDataset, LabelEncoder)> {
    let (features, species) = raw()?;
    let (encoder, codes) = LabelEncoder::fit_transform(&species);
    let dataset = TabularDataset::new(features, LabelTable::new(TARGET_NAME, codes))?;
    Ok((dataset, encoder))
}

/// Write `root/iris/data.csv` and `root/iris/targets.csv`, creating the
/// directory if absent. Returns the dataset directory.
pub fn export(root: &Path) -> Result<PathBuf> {
    let (dataset, encoder) = load()?;
    let dir = root.join(DATASET_NAME);
    dataset.save_dir(&dir)?;
    log::info!(
        "exported {} iris records ({} classes: {}) to {}",
        dataset.labels().len(),
        encoder.classes().len(),
        encoder.classes().join(", "),
        dir.display()
    );
    Ok(dir)
}
