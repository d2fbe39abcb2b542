//! One analysis pass: normalize, join, then answer queries.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{info, warn};

use crate::calculate::{Query, QueryError, QueryOutput};
use crate::join::{left_join, JoinIntegrityError};
use crate::models::{DatasetSummary, EventRecord, JoinedEvent, MatchRecord, RawTable};
use crate::schema::{normalize_events, normalize_matches, AliasTable, SchemaError};

/// Fatal errors while preparing a dataset.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("join integrity error: {0}")]
    Join(#[from] JoinIntegrityError),
}

/// Immutable, joined tables for one analysis pass.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    matches: Vec<MatchRecord>,
    events: Vec<JoinedEvent>,
}

impl Dataset {
    /// Normalize and join already-loaded tables.
    pub fn prepare(matches: &RawTable, events: &RawTable, aliases: &AliasTable) -> Result<Self, AnalysisError> {
        let matches = normalize_matches(matches, aliases)?;
        let events = normalize_events(events, aliases)?;
        Ok(Self::from_records(matches, events)?)
    }

    /// Join typed records.
    pub fn from_records(matches: Vec<MatchRecord>, events: Vec<EventRecord>) -> Result<Self, JoinIntegrityError> {
        if matches.is_empty() {
            warn!("Matches table is empty");
        }
        if events.is_empty() {
            warn!("Events table is empty");
        }

        let events = left_join(&events, &matches)?;
        let dataset = Self { matches, events };

        let summary = dataset.summary();
        info!(
            "Prepared dataset: {} matches, {} events ({} unmatched), {} seasons",
            summary.matches, summary.events, summary.unmatched_events, summary.seasons
        );
        Ok(dataset)
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn events(&self) -> &[JoinedEvent] {
        &self.events
    }

    pub fn summary(&self) -> DatasetSummary {
        let seasons: HashSet<&str> = self.matches.iter().map(|m| m.season.as_str()).collect();
        DatasetSummary {
            matches: self.matches.len(),
            events: self.events.len(),
            unmatched_events: self.events.iter().filter(|e| !e.is_matched()).count(),
            seasons: seasons.len(),
        }
    }

    pub fn run(&self, query: &Query) -> Result<QueryOutput, QueryError> {
        query.execute(&self.matches, &self.events)
    }
}
