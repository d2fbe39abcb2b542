//! CSV tables with a header row.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::{null_if_blank, StorageError};
use crate::models::RawTable;

/// Read a CSV file into a raw table.
///
/// Rows are read flexibly: short rows are padded with nulls and long rows
/// truncated to the header width.
pub fn read_csv(path: &Path) -> Result<RawTable, StorageError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut table = RawTable::new(columns);

    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(null_if_blank).collect());
    }

    debug!("Read {} CSV rows from {:?}", table.len(), path);
    Ok(table)
}
