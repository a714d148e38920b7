use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{FeatureTable, LabelTable};
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Parquet,
}

fn format_of(path: &Path) -> Result<Format> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => Ok(Format::Csv),
        "parquet" | "pq" => Ok(Format::Parquet),
        other => Err(DatasetError::load(
            path,
            format!("unsupported file extension: .{other}"),
        )),
    }
}

/// Load a feature table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row of feature names, one numeric value per cell
/// * `.parquet` – one numeric column per feature
pub fn load_features(path: &Path) -> Result<FeatureTable> {
    match format_of(path)? {
        Format::Csv => {
            let reader = csv_reader(path)?;
            read_features_csv(reader, path)
        }
        Format::Parquet => load_features_parquet(path),
    }
}

/// Load a single-column label table.  Dispatch by extension.
pub fn load_labels(path: &Path) -> Result<LabelTable> {
    match format_of(path)? {
        Format::Csv => {
            let reader = csv_reader(path)?;
            read_labels_csv(reader, path)
        }
        Format::Parquet => load_labels_parquet(path),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DatasetError::load(path, e))
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>, origin: &Path) -> Result<Vec<String>> {
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DatasetError::load(origin, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(DatasetError::load(origin, "missing header row"));
    }
    Ok(headers)
}

/// CSV layout: header row with feature names, then one row per sample.
/// Rows with a different field count than the header are rejected.
pub(crate) fn read_features_csv<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &Path,
) -> Result<FeatureTable> {
    let columns = read_headers(&mut reader, origin)?;
    let mut values = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DatasetError::load(origin, e))?;
        for (col, cell) in record.iter().enumerate() {
            values.push(parse_f64(cell, row_no, &columns[col], origin)?);
        }
    }

    Ok(FeatureTable::from_flat(columns, values))
}

/// CSV layout: a single header naming the label, then one integer per row.
pub(crate) fn read_labels_csv<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &Path,
) -> Result<LabelTable> {
    let headers = read_headers(&mut reader, origin)?;
    if headers.len() != 1 {
        return Err(DatasetError::load(
            origin,
            format!("expected one label column, found {}", headers.len()),
        ));
    }
    let column = headers.into_iter().next().unwrap_or_default();

    let mut labels = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DatasetError::load(origin, e))?;
        let cell = record.get(0).unwrap_or("");
        labels.push(parse_label(cell, row_no, origin)?);
    }

    Ok(LabelTable::new(column, labels))
}

fn parse_f64(cell: &str, row: usize, column: &str, origin: &Path) -> Result<f64> {
    cell.parse::<f64>().map_err(|_| {
        DatasetError::load(
            origin,
            format!("row {row}, column '{column}': '{cell}' is not a number"),
        )
    })
}

/// Integer labels; integral floats such as `"2.0"` are accepted as well.
fn parse_label(cell: &str, row: usize, origin: &Path) -> Result<i64> {
    if let Ok(i) = cell.parse::<i64>() {
        return Ok(i);
    }
    match cell.parse::<f64>().ok().and_then(integral) {
        Some(i) => Ok(i),
        None => Err(DatasetError::load(
            origin,
            format!("row {row}: '{cell}' is not an integer label"),
        )),
    }
}

/// `f` as an `i64` when it has no fractional part and fits.
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Write a feature table with a header row.  `f64` values are written in
/// their shortest round-tripping form.
pub fn write_features_csv(table: &FeatureTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| DatasetError::write(path, e))?;
    writer
        .write_record(table.columns())
        .map_err(|e| DatasetError::write(path, e))?;

    for row in table.iter_rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| DatasetError::write(path, e))?;
    }
    writer.flush().map_err(|e| DatasetError::write(path, e))?;
    Ok(())
}

pub fn write_labels_csv(table: &LabelTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| DatasetError::write(path, e))?;
    writer
        .write_record([table.column()])
        .map_err(|e| DatasetError::write(path, e))?;

    for label in table.labels() {
        writer
            .write_record([label.to_string()])
            .map_err(|e| DatasetError::write(path, e))?;
    }
    writer.flush().map_err(|e| DatasetError::write(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Read every record batch of a Parquet file.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<(Vec<String>, Vec<RecordBatch>)> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::load(path, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| DatasetError::load(path, e))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(|e| DatasetError::load(path, e))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| DatasetError::load(path, e))?;
    Ok((columns, batches))
}

/// Cast a column to `to` and reject nulls.
fn cast_column(col: &ArrayRef, to: &DataType, name: &str, path: &Path) -> Result<ArrayRef> {
    let casted = cast(col, to).map_err(|e| {
        DatasetError::load(path, format!("column '{name}' is not numeric: {e}"))
    })?;
    if casted.null_count() > 0 {
        return Err(DatasetError::load(
            path,
            format!("column '{name}' contains nulls or non-numeric values"),
        ));
    }
    Ok(casted)
}

/// Expected schema: one column per feature, any numeric type.
fn load_features_parquet(path: &Path) -> Result<FeatureTable> {
    let (columns, batches) = read_parquet(path)?;
    if columns.is_empty() {
        return Err(DatasetError::load(path, "parquet file has no columns"));
    }

    let mut values = Vec::new();
    for batch in &batches {
        let casted = columns
            .iter()
            .enumerate()
            .map(|(i, name)| cast_column(batch.column(i), &DataType::Float64, name, path))
            .collect::<Result<Vec<_>>>()?;
        let arrays = casted
            .iter()
            .map(|a| {
                a.as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| DatasetError::load(path, "expected Float64Array after cast"))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            values.extend(arrays.iter().map(|a| a.value(row)));
        }
    }

    Ok(FeatureTable::from_flat(columns, values))
}

/// Expected schema: exactly one integer (or integral float) column.
/// Float columns are checked value by value; fractional labels are rejected.
fn load_labels_parquet(path: &Path) -> Result<LabelTable> {
    let (columns, batches) = read_parquet(path)?;
    if columns.len() != 1 {
        return Err(DatasetError::load(
            path,
            format!("expected one label column, found {}", columns.len()),
        ));
    }
    let column = columns[0].clone();

    let mut labels = Vec::new();
    for batch in &batches {
        let col = batch.column(0);
        let floating = col.data_type().is_floating()
            || matches!(col.data_type(), DataType::Decimal128(..) | DataType::Decimal256(..));
        if floating {
            let casted = cast_column(col, &DataType::Float64, &column, path)?;
            let arr = casted
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| DatasetError::load(path, "expected Float64Array after cast"))?;
            for &f in arr.values().iter() {
                let label = integral(f).ok_or_else(|| {
                    DatasetError::load(
                        path,
                        format!("row {}: '{f}' is not an integer label", labels.len()),
                    )
                })?;
                labels.push(label);
            }
        } else {
            let casted = cast_column(col, &DataType::Int64, &column, path)?;
            let arr = casted
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| DatasetError::load(path, "expected Int64Array after cast"))?;
            labels.extend(arr.values().iter().copied());
        }
    }

    Ok(LabelTable::new(column, labels))
}
