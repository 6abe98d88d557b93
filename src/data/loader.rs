use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, DatasetBundle, DatasetName, Record, Table};
use super::normalize::normalize_table;
use crate::config::DatasetFiles;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Retrieval seam
// ---------------------------------------------------------------------------

/// Brings a named dataset file onto local disk.
///
/// The transport (shared drive, object store, plain directory) is opaque to
/// the loader; implementations only promise a readable local path.
pub trait DatasetSource: Send + Sync {
    fn retrieve(&self, file: &str) -> io::Result<PathBuf>;
}

/// Source that reads the files straight out of a local directory.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }
}

impl DatasetSource for DirectorySource {
    fn retrieve(&self, file: &str) -> io::Result<PathBuf> {
        let path = self.root.join(file);
        if path.is_file() {
            Ok(path)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found in {}", file, self.root.display()),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle loading
// ---------------------------------------------------------------------------

/// Retrieve, parse and normalize all four datasets.
///
/// Any failure aborts the whole load: the dashboard never starts from a
/// partial bundle.
pub fn load_bundle(source: &dyn DatasetSource, files: &DatasetFiles) -> Result<DatasetBundle, LoadError> {
    let mut bundle = DatasetBundle::default();

    for name in DatasetName::ALL {
        let file = files.get(name).to_string();
        let path = source.retrieve(&file).map_err(|e| LoadError::Retrieval {
            dataset: name,
            file: file.clone(),
            source: e,
        })?;

        let table = load_table(&path).map_err(|e| LoadError::Parse {
            dataset: name,
            file: file.clone(),
            message: format!("{e:#}"),
        })?;

        let table = normalize_table(&table);
        log::info!("{name}: {} rows, {} columns", table.len(), table.columns.len());
        bundle.set(name, table);
    }

    Ok(bundle)
}

// ---------------------------------------------------------------------------
// Single-file loading
// ---------------------------------------------------------------------------

/// Load one tabular file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names, one record per row
/// * `.json`    – records-oriented array `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat file with scalar columns
pub fn load_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut row = Record::new();
        for (col_idx, value) in record.iter().enumerate() {
            let Some(col_name) = headers.get(col_idx) else {
                continue;
            };
            row.insert(col_name.clone(), guess_cell_type(value));
        }
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    let t = s.trim();
    if t.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = t.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        return CellValue::Float(f);
    }
    if t == "true" || t == "false" {
        return CellValue::Bool(t == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Año": 2024, "Institución": "…", "Sector": "…", "AC_Total": 10, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = Record::new();
        for (key, val) in obj {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns (strings, ints, floats, bools).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if columns.is_empty() {
            columns = schema.fields().iter().map(|f| f.name().clone()).collect();
        }

        for row in 0..batch.num_rows() {
            let mut record = Record::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_cell_value(batch.column(col_idx), row);
                record.insert(field.name().clone(), value);
            }
            rows.push(record);
        }
    }

    Ok(Table::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                CellValue::String(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                CellValue::String(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        _ => CellValue::String(format!("{:?}", col.data_type())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sicoin-{}-{name}", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_round_trip_types() {
        let path = temp_csv(
            "types.csv",
            "Año,Institución,AC_Total,1Cumplimiento\n2024,Salud Norte,10,50.5\n",
        );
        let table = load_table(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.columns, vec!["Año", "Institución", "AC_Total", "1Cumplimiento"]);
        assert_eq!(table.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row["Año"], CellValue::Integer(2024));
        assert_eq!(row["Institución"], CellValue::String("Salud Norte".into()));
        assert_eq!(row["1Cumplimiento"], CellValue::Float(50.5));
    }

    #[test]
    fn empty_cells_become_null() {
        let path = temp_csv("null.csv", "Año,Sector\n2024,\n");
        let table = load_table(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(table.rows[0]["Sector"], CellValue::Null);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        assert!(load_table(Path::new("datos.xls")).is_err());
    }

    #[test]
    fn directory_source_reports_missing_files() {
        let source = DirectorySource::new(std::env::temp_dir());
        let err = source.retrieve("definitely-not-there.csv").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
