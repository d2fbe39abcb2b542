//! JSONL (JSON Lines) tables.
//!
//! Each line is one JSON object; its keys are column names. Columns are
//! collected in first-seen order across all rows, and a key missing from a
//! row reads as null.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{null_if_blank, StorageError};
use crate::models::RawTable;

/// JSONL file reader.
pub struct JsonlReader {
    path: PathBuf,
}

impl JsonlReader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Iterate over the objects in the file, with their 1-based line numbers.
    pub fn objects(&self) -> Result<JsonlObjects, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        Ok(JsonlObjects {
            reader: BufReader::new(file),
            line_num: 0,
        })
    }

    /// Read the whole file into a raw table.
    ///
    /// Lines that are not valid JSON objects are skipped with a warning.
    pub fn read_table(&self) -> Result<RawTable, StorageError> {
        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut objects = Vec::new();
        let mut skipped = 0;

        for item in self.objects()? {
            match item {
                Ok((_, object)) => {
                    for key in object.keys() {
                        if !positions.contains_key(key) {
                            positions.insert(key.clone(), columns.len());
                            columns.push(key.clone());
                        }
                    }
                    objects.push(object);
                }
                Err(StorageError::Json { line, message }) => {
                    warn!("Skipping line {} in {:?}: {}", line, self.path, message);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let width = columns.len();
        let mut table = RawTable::new(columns);
        for object in objects {
            let mut row = vec![None; width];
            for (key, value) in object {
                if let Some(&idx) = positions.get(&key) {
                    row[idx] = cell_text(&value);
                }
            }
            table.push_row(row);
        }

        debug!("Read {} JSONL rows from {:?} ({} skipped)", table.len(), self.path, skipped);
        Ok(table)
    }
}

/// Render a JSON value as cell text. Nested values keep their JSON form.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => null_if_blank(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Iterator over the objects of a JSONL file. Blank lines are skipped.
pub struct JsonlObjects {
    reader: BufReader<File>,
    line_num: usize,
}

impl Iterator for JsonlObjects {
    type Item = Result<(usize, Map<String, Value>), StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();

        loop {
            line.clear();
            self.line_num += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let line_num = self.line_num;
                    let parsed = match serde_json::from_str::<Value>(&line) {
                        Ok(Value::Object(object)) => Ok((line_num, object)),
                        Ok(_) => Err(StorageError::Json {
                            line: line_num,
                            message: "expected a JSON object".to_string(),
                        }),
                        Err(e) => Err(StorageError::Json {
                            line: line_num,
                            message: e.to_string(),
                        }),
                    };
                    return Some(parsed);
                }
                Err(e) => return Some(Err(StorageError::Io(e))),
            }
        }
    }
}
