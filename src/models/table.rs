//! Untyped tables as handed over by the loaders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Matches,
    Events,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Matches => write!(f, "matches"),
            TableKind::Events => write!(f, "events"),
        }
    }
}

/// Header names plus nullable string cells, in source order.
///
/// Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from borrowed cells. Mostly useful in tests.
    pub fn with_rows(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> Self {
        let mut table = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.into_iter().map(|c| c.map(str::to_string)).collect());
        }
        table
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, compared case-insensitively after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(wanted))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_case_insensitive() {
        let table = RawTable::with_rows(&["id", " Season "], vec![]);
        assert_eq!(table.column_index("season"), Some(1));
        assert_eq!(table.column_index("ID"), Some(0));
        assert_eq!(table.column_index("venue"), None);
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut table = RawTable::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![Some("1".into())]);
        table.push_row(vec![Some("1".into()), Some("2".into()), Some("3".into())]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.rows()[1].len(), 2);
        assert_eq!(table.cell(1, 1), Some("2"));
    }

    #[test]
    fn test_cell_out_of_range() {
        let table = RawTable::with_rows(&["a"], vec![vec![Some("x")]]);
        assert_eq!(table.cell(5, 0), None);
        assert_eq!(table.cell(0, 5), None);
    }

    #[test]
    fn test_table_kind_display() {
        assert_eq!(TableKind::Matches.to_string(), "matches");
        assert_eq!(TableKind::Events.to_string(), "events");
    }
}
