//! Row predicates for counting queries.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{Column, Record};

/// Dismissals the bowler is not credited with.
pub const RUN_OUT: &str = "run out";

/// A predicate over one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// A wicket fell on the delivery.
    DismissalOccurred,
    /// A wicket fell and it was not a run out.
    WicketCredited,
    NotNull { column: Column },
    Equals { column: Column, value: String },
    /// Also true when the column is null.
    NotEquals { column: Column, value: String },
    All { filters: Vec<Filter> },
}

impl Filter {
    pub fn matches<R: Record>(&self, row: &R) -> bool {
        match self {
            Filter::DismissalOccurred => row.dismissal_occurred(),
            Filter::WicketCredited => {
                row.dismissal_occurred()
                    && row
                        .category(Column::DismissalKind)
                        .is_some_and(|kind| !kind.eq_ignore_ascii_case(RUN_OUT))
            }
            Filter::NotNull { column } => row.category(*column).is_some(),
            Filter::Equals { column, value } => row.category(*column) == Some(value.as_str()),
            Filter::NotEquals { column, value } => row.category(*column) != Some(value.as_str()),
            Filter::All { filters } => filters.iter().all(|f| f.matches(row)),
        }
    }

    /// Every column the predicate reads.
    pub fn columns(&self) -> Vec<Column> {
        match self {
            Filter::DismissalOccurred => Vec::new(),
            Filter::WicketCredited => vec![Column::DismissalKind],
            Filter::NotNull { column }
            | Filter::Equals { column, .. }
            | Filter::NotEquals { column, .. } => vec![*column],
            Filter::All { filters } => filters.iter().flat_map(Filter::columns).collect(),
        }
    }

    /// Whether the predicate reads delivery-level data.
    pub fn needs_events(&self) -> bool {
        match self {
            Filter::DismissalOccurred | Filter::WicketCredited => true,
            Filter::All { filters } => filters.iter().any(Filter::needs_events),
            _ => false,
        }
    }
}

/// Short forms for the command line: `wicket_credited`, `dismissal_occurred`,
/// `not_null:<column>`, `<column>=<value>`, `<column>!=<value>`.
impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "wicket_credited" | "wickets" => return Ok(Filter::WicketCredited),
            "dismissal_occurred" | "dismissals" => return Ok(Filter::DismissalOccurred),
            _ => {}
        }
        if let Some(column) = s.strip_prefix("not_null:") {
            return Ok(Filter::NotNull {
                column: column.parse()?,
            });
        }
        if let Some((column, value)) = s.split_once("!=") {
            return Ok(Filter::NotEquals {
                column: column.parse()?,
                value: value.trim().to_string(),
            });
        }
        if let Some((column, value)) = s.split_once('=') {
            return Ok(Filter::Equals {
                column: column.parse()?,
                value: value.trim().to_string(),
            });
        }
        Err(format!("unknown filter: {}", s))
    }
}
