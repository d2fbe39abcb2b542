//! Parquet tables.
//!
//! Every column is cast to UTF-8 so that Parquet input flows through the
//! same normalizer as CSV and JSONL. Arrow nulls stay null.

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use super::{null_if_blank, StorageError};
use crate::models::RawTable;

/// Read a Parquet file into a raw table.
pub fn read_parquet(path: &Path) -> Result<RawTable, StorageError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let columns: Vec<String> = builder.schema().fields().iter().map(|f| f.name().clone()).collect();
    let reader = builder.build()?;

    let mut table = RawTable::new(columns);
    let mut batches = 0;
    for batch in reader {
        append_batch(&mut table, &batch?)?;
        batches += 1;
    }

    debug!("Read {} Parquet rows in {} batches from {:?}", table.len(), batches, path);
    Ok(table)
}

fn append_batch(table: &mut RawTable, batch: &RecordBatch) -> Result<(), StorageError> {
    let strings = batch
        .columns()
        .iter()
        .map(|column| cast(column, &DataType::Utf8))
        .collect::<Result<Vec<_>, _>>()?;

    for row in 0..batch.num_rows() {
        let cells = strings
            .iter()
            .map(|column| {
                if column.is_null(row) {
                    None
                } else {
                    null_if_blank(column.as_string::<i32>().value(row))
                }
            })
            .collect();
        table.push_row(cells);
    }
    Ok(())
}
