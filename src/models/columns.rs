//! Canonical column vocabulary shared by the normalizer, the aggregation
//! engine and the query layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which table a query reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// One row per match.
    Matches,
    /// One row per delivery, joined with its match.
    Events,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Matches => write!(f, "matches"),
            Source::Events => write!(f, "events"),
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matches" | "match" => Ok(Source::Matches),
            "events" | "event" | "deliveries" => Ok(Source::Events),
            other => Err(format!("unknown source: {}", other)),
        }
    }
}

/// Categorical columns usable as group keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    MatchId,
    Season,
    Venue,
    Winner,
    /// Batsman on strike.
    #[serde(alias = "batsman")]
    ActorPrimary,
    /// Bowler.
    #[serde(alias = "bowler")]
    ActorSecondary,
    DismissalKind,
    DismissedActor,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::MatchId,
        Column::Season,
        Column::Venue,
        Column::Winner,
        Column::ActorPrimary,
        Column::ActorSecondary,
        Column::DismissalKind,
        Column::DismissedActor,
    ];

    /// Canonical column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::MatchId => "match_id",
            Column::Season => "season",
            Column::Venue => "venue",
            Column::Winner => "winner",
            Column::ActorPrimary => "actor_primary",
            Column::ActorSecondary => "actor_secondary",
            Column::DismissalKind => "dismissal_kind",
            Column::DismissedActor => "dismissed_actor",
        }
    }

    /// Whether rows of `source` carry this column.
    ///
    /// Joined events expose the match-level attributes as well.
    pub fn available_on(&self, source: Source) -> bool {
        match source {
            Source::Events => true,
            Source::Matches => matches!(
                self,
                Column::MatchId | Column::Season | Column::Venue | Column::Winner
            ),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "batsman" | "batter" => return Ok(Column::ActorPrimary),
            "bowler" => return Ok(Column::ActorSecondary),
            _ => {}
        }
        Column::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown column: {}", s))
    }
}

/// Integer-valued columns that can be summed or binned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueColumn {
    #[serde(alias = "batsman_runs")]
    PrimaryRuns,
    ExtraRuns,
    /// `primary_runs + extra_runs`
    TotalRuns,
    WinByRuns,
    WinByWickets,
}

impl ValueColumn {
    pub const ALL: [ValueColumn; 5] = [
        ValueColumn::PrimaryRuns,
        ValueColumn::ExtraRuns,
        ValueColumn::TotalRuns,
        ValueColumn::WinByRuns,
        ValueColumn::WinByWickets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueColumn::PrimaryRuns => "primary_runs",
            ValueColumn::ExtraRuns => "extra_runs",
            ValueColumn::TotalRuns => "total_runs",
            ValueColumn::WinByRuns => "win_by_runs",
            ValueColumn::WinByWickets => "win_by_wickets",
        }
    }

    pub fn available_on(&self, source: Source) -> bool {
        match source {
            Source::Matches => matches!(self, ValueColumn::WinByRuns | ValueColumn::WinByWickets),
            Source::Events => matches!(
                self,
                ValueColumn::PrimaryRuns | ValueColumn::ExtraRuns | ValueColumn::TotalRuns
            ),
        }
    }
}

impl fmt::Display for ValueColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "batsman_runs" {
            return Ok(ValueColumn::PrimaryRuns);
        }
        ValueColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown value column: {}", s))
    }
}

/// Row access used by the aggregation primitives.
///
/// A column the row type does not carry reads as `None`, same as a null cell.
pub trait Record {
    fn category(&self, column: Column) -> Option<&str>;

    fn value(&self, column: ValueColumn) -> Option<u64>;

    fn dismissal_occurred(&self) -> bool {
        false
    }
}

/// Borrowed rows, so filtered subsets aggregate without cloning.
impl<R: Record> Record for &R {
    fn category(&self, column: Column) -> Option<&str> {
        (**self).category(column)
    }

    fn value(&self, column: ValueColumn) -> Option<u64> {
        (**self).value(column)
    }

    fn dismissal_occurred(&self) -> bool {
        (**self).dismissal_occurred()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_from_str_aliases() {
        assert_eq!("batsman".parse::<Column>().unwrap(), Column::ActorPrimary);
        assert_eq!("Bowler".parse::<Column>().unwrap(), Column::ActorSecondary);
        assert_eq!("season".parse::<Column>().unwrap(), Column::Season);
        assert!("umpire".parse::<Column>().is_err());
    }

    #[test]
    fn test_column_availability() {
        assert!(Column::Season.available_on(Source::Matches));
        assert!(Column::Season.available_on(Source::Events));
        assert!(!Column::ActorPrimary.available_on(Source::Matches));
    }

    #[test]
    fn test_value_column_availability() {
        assert!(ValueColumn::WinByRuns.available_on(Source::Matches));
        assert!(!ValueColumn::WinByRuns.available_on(Source::Events));
        assert!(ValueColumn::TotalRuns.available_on(Source::Events));
    }

    #[test]
    fn test_column_serde_alias() {
        let col: Column = serde_json::from_str("\"batsman\"").unwrap();
        assert_eq!(col, Column::ActorPrimary);
        assert_eq!(serde_json::to_string(&col).unwrap(), "\"actor_primary\"");
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("deliveries".parse::<Source>().unwrap(), Source::Events);
        assert_eq!("Matches".parse::<Source>().unwrap(), Source::Matches);
    }
}
