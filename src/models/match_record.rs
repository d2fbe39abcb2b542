//! Match-level record.

use serde::{Deserialize, Serialize};

use super::{Column, Record, ValueColumn};

/// One completed (or abandoned) match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Unique key, referenced by events
    pub match_id: String,

    /// Season label (usually the year)
    pub season: String,

    /// Ground name
    pub venue: Option<String>,

    /// Winning team, `None` for no-result matches
    pub winner: Option<String>,

    /// Margin when the side batting first won
    pub win_by_runs: u64,

    /// Margin when the chasing side won, 0..=10
    pub win_by_wickets: u8,
}

impl MatchRecord {
    /// Create a match with no venue, winner or margin.
    pub fn new(match_id: impl Into<String>, season: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            season: season.into(),
            venue: None,
            winner: None,
            win_by_runs: 0,
            win_by_wickets: 0,
        }
    }

    pub fn with_winner(mut self, winner: impl Into<String>) -> Self {
        self.winner = Some(winner.into());
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_margin(mut self, runs: u64, wickets: u8) -> Self {
        self.win_by_runs = runs;
        self.win_by_wickets = wickets;
        self
    }

    /// True when the match produced a result.
    pub fn has_result(&self) -> bool {
        self.winner.is_some()
    }
}

impl Record for MatchRecord {
    fn category(&self, column: Column) -> Option<&str> {
        match column {
            Column::MatchId => Some(&self.match_id),
            Column::Season => Some(&self.season),
            Column::Venue => self.venue.as_deref(),
            Column::Winner => self.winner.as_deref(),
            _ => None,
        }
    }

    fn value(&self, column: ValueColumn) -> Option<u64> {
        match column {
            ValueColumn::WinByRuns => Some(self.win_by_runs),
            ValueColumn::WinByWickets => Some(u64::from(self.win_by_wickets)),
            _ => None,
        }
    }
}
