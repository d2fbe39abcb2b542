//! Delivery-level records and their joined form.

use serde::{Deserialize, Serialize};

use super::{Column, MatchRecord, Record, ValueColumn};

/// One delivery within a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Foreign key into the matches table
    pub match_id: String,

    /// Batsman on strike
    pub actor_primary: String,

    /// Bowler
    pub actor_secondary: String,

    /// Runs credited to the batsman
    pub primary_runs: u64,

    /// Wides, no-balls, byes and leg-byes
    pub extra_runs: u64,

    /// Whether a wicket fell on this delivery
    pub dismissal_occurred: bool,

    /// How the wicket fell; set only when `dismissal_occurred`
    pub dismissal_kind: Option<String>,

    /// Who was out (may be the non-striker on a run out)
    pub dismissed_actor: Option<String>,
}

impl EventRecord {
    /// Create a delivery with no extras and no dismissal.
    pub fn new(
        match_id: impl Into<String>,
        actor_primary: impl Into<String>,
        actor_secondary: impl Into<String>,
        primary_runs: u64,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            actor_primary: actor_primary.into(),
            actor_secondary: actor_secondary.into(),
            primary_runs,
            extra_runs: 0,
            dismissal_occurred: false,
            dismissal_kind: None,
            dismissed_actor: None,
        }
    }

    pub fn with_extras(mut self, extra_runs: u64) -> Self {
        self.extra_runs = extra_runs;
        self
    }

    /// Mark the striker as dismissed.
    pub fn with_dismissal(self, kind: impl Into<String>) -> Self {
        let striker = self.actor_primary.clone();
        self.with_dismissal_of(kind, striker)
    }

    pub fn with_dismissal_of(mut self, kind: impl Into<String>, dismissed: impl Into<String>) -> Self {
        self.dismissal_occurred = true;
        self.dismissal_kind = Some(kind.into());
        self.dismissed_actor = Some(dismissed.into());
        self
    }

    pub fn total_runs(&self) -> u64 {
        self.primary_runs.saturating_add(self.extra_runs)
    }
}

impl Record for EventRecord {
    fn category(&self, column: Column) -> Option<&str> {
        match column {
            Column::MatchId => Some(&self.match_id),
            Column::ActorPrimary => Some(&self.actor_primary),
            Column::ActorSecondary => Some(&self.actor_secondary),
            Column::DismissalKind => self.dismissal_kind.as_deref(),
            Column::DismissedActor => self.dismissed_actor.as_deref(),
            Column::Season | Column::Venue | Column::Winner => None,
        }
    }

    fn value(&self, column: ValueColumn) -> Option<u64> {
        match column {
            ValueColumn::PrimaryRuns => Some(self.primary_runs),
            ValueColumn::ExtraRuns => Some(self.extra_runs),
            ValueColumn::TotalRuns => Some(self.total_runs()),
            ValueColumn::WinByRuns | ValueColumn::WinByWickets => None,
        }
    }

    fn dismissal_occurred(&self) -> bool {
        self.dismissal_occurred
    }
}

/// A delivery carrying the attributes of its match.
///
/// Match attributes are `None` when the delivery's `match_id` has no match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedEvent {
    pub event: EventRecord,
    pub season: Option<String>,
    pub venue: Option<String>,
    pub winner: Option<String>,
    pub total_runs: u64,
}

impl JoinedEvent {
    pub fn new(event: EventRecord, found: Option<&MatchRecord>) -> Self {
        let total_runs = event.total_runs();
        Self {
            season: found.map(|m| m.season.clone()),
            venue: found.and_then(|m| m.venue.clone()),
            winner: found.and_then(|m| m.winner.clone()),
            total_runs,
            event,
        }
    }

    /// The season is the one attribute every match carries.
    pub fn is_matched(&self) -> bool {
        self.season.is_some()
    }
}

impl Record for JoinedEvent {
    fn category(&self, column: Column) -> Option<&str> {
        match column {
            Column::Season => self.season.as_deref(),
            Column::Venue => self.venue.as_deref(),
            Column::Winner => self.winner.as_deref(),
            other => self.event.category(other),
        }
    }

    fn value(&self, column: ValueColumn) -> Option<u64> {
        match column {
            ValueColumn::TotalRuns => Some(self.total_runs),
            other => self.event.value(other),
        }
    }

    fn dismissal_occurred(&self) -> bool {
        self.event.dismissal_occurred
    }
}
