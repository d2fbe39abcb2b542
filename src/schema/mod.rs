//! Schema normalization.
//!
//! Turns loader output (`RawTable`) into typed match and event records,
//! resolving source column names through one `AliasTable`.

mod alias;

pub use alias::*;

use std::borrow::Cow;

use thiserror::Error;
use tracing::debug;

use crate::models::{EventRecord, MatchRecord, RawTable, TableKind};

/// Structural problems in an input table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{table} table is missing required column `{column}` (tried: {})", .tried.join(", "))]
    MissingColumn {
        table: TableKind,
        column: &'static str,
        tried: Vec<String>,
    },

    #[error("{table} table, column `{column}`, row {row}: {reason} ({value:?})")]
    InvalidValue {
        table: TableKind,
        column: &'static str,
        row: usize,
        value: String,
        reason: &'static str,
    },
}

const MAX_WICKETS: u64 = 10;

/// Column lookups bound to one table.
struct Columns<'a> {
    raw: &'a RawTable,
    kind: TableKind,
    aliases: &'a AliasTable,
}

impl<'a> Columns<'a> {
    fn required(&self, canonical: &'static str) -> Result<usize, SchemaError> {
        self.aliases
            .resolve(self.raw, canonical)
            .ok_or_else(|| SchemaError::MissingColumn {
                table: self.kind,
                column: canonical,
                tried: self.aliases.aliases_for(canonical).to_vec(),
            })
    }

    fn optional(&self, canonical: &'static str) -> Option<usize> {
        self.aliases.resolve(self.raw, canonical)
    }

    fn text(&self, row: usize, column: Option<usize>) -> Option<String> {
        column
            .and_then(|c| self.raw.cell(row, c))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn key(&self, row: usize, column: usize, name: &'static str) -> Result<String, SchemaError> {
        self.text(row, Some(column))
            .ok_or_else(|| self.invalid(row, name, "", "required value is null"))
    }

    /// Join key cell, with integral float spellings collapsed.
    fn match_key(&self, row: usize, column: usize) -> Result<String, SchemaError> {
        let key = self.key(row, column, "match_id")?;
        Ok(canonical_match_id(&key).into_owned())
    }

    /// Non-negative integer; null reads as 0.
    fn count(&self, row: usize, column: Option<usize>, name: &'static str) -> Result<u64, SchemaError> {
        match self.text(row, column) {
            None => Ok(0),
            Some(s) => parse_count(&s).ok_or_else(|| {
                self.invalid(row, name, &s, "expected a non-negative integer")
            }),
        }
    }

    fn flag(&self, row: usize, column: Option<usize>, name: &'static str) -> Result<Option<bool>, SchemaError> {
        match self.text(row, column) {
            None => Ok(None),
            Some(s) => parse_flag(&s)
                .map(Some)
                .ok_or_else(|| self.invalid(row, name, &s, "expected a boolean")),
        }
    }

    fn invalid(&self, row: usize, column: &'static str, value: &str, reason: &'static str) -> SchemaError {
        SchemaError::InvalidValue {
            table: self.kind,
            column,
            row,
            value: value.to_string(),
            reason,
        }
    }
}

/// Parse an integer cell. Float spellings without a fraction (`"4.0"`) are
/// accepted because exported CSVs often widen integer columns with nulls.
fn parse_count(s: &str) -> Option<u64> {
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let f: f64 = s.parse().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// Canonical spelling of a match id: `"7.0"` and `"7"` both become `"7"`.
/// Non-numeric ids are returned unchanged.
pub fn canonical_match_id(id: &str) -> Cow<'_, str> {
    let trimmed = id.trim();
    if trimmed.parse::<u64>().is_ok() {
        return Cow::Borrowed(trimmed);
    }
    match parse_count(trimmed) {
        Some(n) => Cow::Owned(n.to_string()),
        None => Cow::Borrowed(trimmed),
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "0.0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Normalize the matches table.
pub fn normalize_matches(raw: &RawTable, aliases: &AliasTable) -> Result<Vec<MatchRecord>, SchemaError> {
    let cols = Columns {
        raw,
        kind: TableKind::Matches,
        aliases,
    };

    let match_id = cols.required("match_id")?;
    let season = cols.required("season")?;
    let winner = cols.required("winner")?;
    let win_by_runs = cols.required("win_by_runs")?;
    let win_by_wickets = cols.required("win_by_wickets")?;
    let venue = cols.optional("venue");

    let mut records = Vec::with_capacity(raw.len());
    for row in 0..raw.len() {
        let wickets = cols.count(row, Some(win_by_wickets), "win_by_wickets")?;
        if wickets > MAX_WICKETS {
            return Err(cols.invalid(
                row,
                "win_by_wickets",
                &wickets.to_string(),
                "wicket margin above 10",
            ));
        }

        records.push(MatchRecord {
            match_id: cols.match_key(row, match_id)?,
            season: cols.key(row, season, "season")?,
            venue: cols.text(row, venue),
            winner: cols.text(row, Some(winner)),
            win_by_runs: cols.count(row, Some(win_by_runs), "win_by_runs")?,
            win_by_wickets: wickets as u8,
        });
    }

    debug!("Normalized {} match rows", records.len());
    Ok(records)
}

/// Normalize the events (deliveries) table.
///
/// `dismissal_occurred` falls back to "dismissal_kind is set" and
/// `dismissed_actor` falls back to the striker when the source omits them.
pub fn normalize_events(raw: &RawTable, aliases: &AliasTable) -> Result<Vec<EventRecord>, SchemaError> {
    let cols = Columns {
        raw,
        kind: TableKind::Events,
        aliases,
    };

    let match_id = cols.required("match_id")?;
    let actor_primary = cols.required("actor_primary")?;
    let actor_secondary = cols.required("actor_secondary")?;
    let primary_runs = cols.required("primary_runs")?;
    let dismissal_kind = cols.required("dismissal_kind")?;
    let extra_runs = cols.optional("extra_runs");
    let dismissal_occurred = cols.optional("dismissal_occurred");
    let dismissed_actor = cols.optional("dismissed_actor");

    let mut records = Vec::with_capacity(raw.len());
    for row in 0..raw.len() {
        let striker = cols.key(row, actor_primary, "actor_primary")?;
        let kind = cols.text(row, Some(dismissal_kind));
        let occurred = cols
            .flag(row, dismissal_occurred, "dismissal_occurred")?
            .unwrap_or(kind.is_some());

        if !occurred && kind.is_some() {
            return Err(cols.invalid(
                row,
                "dismissal_kind",
                kind.as_deref().unwrap_or_default(),
                "dismissal kind set on a delivery without a dismissal",
            ));
        }

        let dismissed = if occurred {
            cols.text(row, dismissed_actor)
                .or_else(|| Some(striker.clone()))
        } else {
            None
        };

        records.push(EventRecord {
            match_id: cols.match_key(row, match_id)?,
            actor_secondary: cols.key(row, actor_secondary, "actor_secondary")?,
            primary_runs: cols.count(row, Some(primary_runs), "primary_runs")?,
            extra_runs: cols.count(row, extra_runs, "extra_runs")?,
            dismissal_occurred: occurred,
            dismissal_kind: kind,
            dismissed_actor: dismissed,
            actor_primary: striker,
        });
    }

    debug!("Normalized {} event rows", records.len());
    Ok(records)
}
