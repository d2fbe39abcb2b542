//! Table loading.
//!
//! Reads raw match and delivery tables from the local data directory:
//! - CSV exports (the usual Kaggle dump)
//! - JSONL, one object per row
//! - Parquet files
//!
//! Every loader produces a [`RawTable`] of optional strings; typing happens
//! later in the schema normalizer.

mod csv;
mod jsonl;
mod parquet;

pub use self::csv::read_csv;
pub use self::jsonl::JsonlReader;
pub use self::parquet::read_parquet;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::RawTable;

/// Errors that can occur while loading tables.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error at line {line}: {message}")]
    Json { line: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Cell texts read as null, in addition to the empty string.
pub const NULL_TOKENS: &[&str] = &["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// Map a raw cell to `None` when it is blank or a null token.
pub(crate) fn null_if_blank(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || NULL_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Supported table file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Jsonl,
    Parquet,
}

impl TableFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(TableFormat::Csv),
            "jsonl" | "ndjson" => Some(TableFormat::Jsonl),
            "parquet" | "pq" => Some(TableFormat::Parquet),
            _ => None,
        }
    }
}

/// Load a table, choosing the reader by file extension.
pub fn load_table(path: &Path) -> Result<RawTable, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    let format = TableFormat::from_path(path).ok_or_else(|| StorageError::UnsupportedFormat(path.to_path_buf()))?;
    let table = match format {
        TableFormat::Csv => read_csv(path)?,
        TableFormat::Jsonl => JsonlReader::new(path.to_path_buf()).read_table()?,
        TableFormat::Parquet => read_parquet(path)?,
    };

    info!("Loaded {} rows ({} columns) from {:?}", table.len(), table.columns().len(), path);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(TableFormat::from_path(Path::new("matches.csv")), Some(TableFormat::Csv));
        assert_eq!(TableFormat::from_path(Path::new("d/events.JSONL")), Some(TableFormat::Jsonl));
        assert_eq!(TableFormat::from_path(Path::new("x.parquet")), Some(TableFormat::Parquet));
        assert_eq!(TableFormat::from_path(Path::new("x.xlsx")), None);
        assert_eq!(TableFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_null_if_blank() {
        assert_eq!(null_if_blank(""), None);
        assert_eq!(null_if_blank("  "), None);
        assert_eq!(null_if_blank("NA"), None);
        assert_eq!(null_if_blank("NaN"), None);
        assert_eq!(null_if_blank(" SRH "), Some("SRH".to_string()));
    }

    #[test]
    fn test_load_table_missing() {
        let err = load_table(Path::new("/nonexistent/matches.csv")).unwrap_err();
        assert!(matches!(err, StorageError::PathNotFound(_)));
    }

    #[test]
    fn test_load_table_unsupported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("matches.xlsx");
        fs::write(&path, "binary").unwrap();

        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_table_dispatch() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("matches.csv");
        fs::write(&csv_path, "id,season\n1,2017\n").unwrap();
        let jsonl_path = temp_dir.path().join("matches.jsonl");
        fs::write(&jsonl_path, "{\"id\": 1, \"season\": 2017}\n").unwrap();

        let from_csv = load_table(&csv_path).unwrap();
        let from_jsonl = load_table(&jsonl_path).unwrap();
        assert_eq!(from_csv.cell(0, 1), Some("2017"));
        assert_eq!(from_jsonl.cell(0, from_jsonl.column_index("season").unwrap()), Some("2017"));
    }
}
