//! Dashboard panels.
//!
//! Each chart of the dashboard is a named [`Query`]. The default set mirrors
//! the season review: top run scorers and wicket takers, wins per season,
//! margin distributions, batting averages and best single-match bowling.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{Aggregation, Filter, Query, QueryError, QueryOutput};
use crate::dataset::Dataset;
use crate::models::{Column, DatasetSummary, Source, ValueColumn};

/// Default number of rows in ranked panels.
pub const DEFAULT_TOP_N: usize = 10;

/// Default bin count for the margin histograms.
pub const DEFAULT_BINS: usize = 30;

/// Panel lookup and panel-set validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("unknown panel `{0}`")]
    UnknownPanel(String),

    #[error("panel #{0} has an empty name")]
    EmptyName(usize),

    #[error("duplicate panel name `{0}`")]
    DuplicateName(String),

    #[error("panel `{name}`: {error}")]
    InvalidQuery { name: String, error: QueryError },
}

/// A titled query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub name: String,
    pub title: String,
    pub query: Query,
}

impl Panel {
    pub fn new(name: &str, title: &str, query: Query) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            query,
        }
    }
}

/// One computed panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelResult {
    pub name: String,
    pub title: String,
    pub result: QueryOutput,
}

/// Every panel computed over one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub summary: DatasetSummary,
    pub panels: Vec<PanelResult>,
}

/// The standard dashboard.
pub fn default_panels() -> Vec<Panel> {
    let n = DEFAULT_TOP_N;
    vec![
        Panel::new(
            "top_batsmen",
            "Top 10 Batsmen (Total Runs)",
            Query::Ranked {
                aggregation: Aggregation::sum(Source::Events, vec![Column::ActorPrimary], ValueColumn::PrimaryRuns),
                limit: n,
            },
        ),
        Panel::new(
            "top_bowlers",
            "Top 10 Bowlers (Wickets)",
            Query::Ranked {
                aggregation: Aggregation::count(Source::Events, vec![Column::ActorSecondary])
                    .with_filter(Filter::WicketCredited),
                limit: n,
            },
        ),
        Panel::new(
            "season_wins",
            "Wins per Team per Season",
            Query::Table {
                aggregation: Aggregation::count(Source::Matches, vec![Column::Season, Column::Winner])
                    .with_filter(Filter::NotNull { column: Column::Winner }),
            },
        ),
        Panel::new(
            "dominant_team_per_season",
            "Dominant Team per Season",
            Query::Argmax {
                source: Source::Matches,
                outer: vec![Column::Season],
                inner: Column::Winner,
                filter: None,
            },
        ),
        Panel::new(
            "win_by_runs_distribution",
            "Distribution of Wins by Runs",
            Query::Histogram {
                source: Source::Matches,
                value: ValueColumn::WinByRuns,
                bins: DEFAULT_BINS,
            },
        ),
        Panel::new(
            "win_by_wickets_distribution",
            "Distribution of Wins by Wickets",
            Query::Histogram {
                source: Source::Matches,
                value: ValueColumn::WinByWickets,
                bins: DEFAULT_BINS,
            },
        ),
        Panel::new(
            "consistent_batsmen",
            "Top 10 Consistent Batsmen (Average Runs per Dismissal)",
            Query::Ratio {
                numerator: Aggregation::sum(Source::Events, vec![Column::ActorPrimary], ValueColumn::PrimaryRuns),
                denominator: Aggregation::count(Source::Events, vec![Column::DismissedActor])
                    .with_filter(Filter::DismissalOccurred),
                limit: n,
            },
        ),
        Panel::new(
            "most_wickets_in_match",
            "Most Wickets in a Single Match",
            Query::Ranked {
                aggregation: Aggregation::count(Source::Events, vec![Column::MatchId, Column::ActorSecondary])
                    .with_filter(Filter::WicketCredited),
                limit: n,
            },
        ),
        Panel::new(
            "runs_per_season",
            "Runs Scored per Season",
            Query::Table {
                aggregation: Aggregation::sum(Source::Events, vec![Column::Season], ValueColumn::TotalRuns),
            },
        ),
    ]
}

pub fn find_panel<'a>(panels: &'a [Panel], name: &str) -> Option<&'a Panel> {
    panels.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Like [`find_panel`], but a missing name is an error.
pub fn require_panel<'a>(panels: &'a [Panel], name: &str) -> Result<&'a Panel, PanelError> {
    find_panel(panels, name).ok_or_else(|| PanelError::UnknownPanel(name.to_string()))
}

/// Run one panel, optionally overriding its row limit.
pub fn run_panel(dataset: &Dataset, panel: &Panel, limit: Option<usize>) -> Result<PanelResult, QueryError> {
    let result = match limit {
        Some(limit) => dataset.run(&panel.query.clone().with_limit(limit))?,
        None => dataset.run(&panel.query)?,
    };
    debug!("Computed panel {}", panel.name);

    Ok(PanelResult {
        name: panel.name.clone(),
        title: panel.title.clone(),
        result,
    })
}

/// Run every panel. The first failing panel aborts the report.
pub fn build_report(dataset: &Dataset, panels: &[Panel]) -> Result<Report, QueryError> {
    let results = panels
        .iter()
        .map(|p| run_panel(dataset, p, None))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Built report with {} panels", results.len());

    Ok(Report {
        generated_at: Utc::now(),
        summary: dataset.summary(),
        panels: results,
    })
}

/// Check that panel names are unique and every query is valid.
pub fn validate_panels(panels: &[Panel]) -> Result<(), PanelError> {
    for (i, panel) in panels.iter().enumerate() {
        if panel.name.trim().is_empty() {
            return Err(PanelError::EmptyName(i + 1));
        }
        if panels[..i].iter().any(|p| p.name.eq_ignore_ascii_case(&panel.name)) {
            return Err(PanelError::DuplicateName(panel.name.clone()));
        }
        panel.query.validate().map_err(|error| PanelError::InvalidQuery {
            name: panel.name.clone(),
            error,
        })?;
    }
    Ok(())
}

/// Plain-text rendering of one panel for terminal output.
pub fn render_text(panel: &PanelResult) -> String {
    let mut out = format!("== {} ==\n", panel.title);
    let empty = match &panel.result {
        QueryOutput::Ranked { entries } => {
            for (i, e) in entries.iter().enumerate() {
                let _ = writeln!(out, "{:>3}. {:<40} {}", i + 1, e.key.to_string(), e.value);
            }
            entries.is_empty()
        }
        QueryOutput::Ratio { entries } => {
            for (i, e) in entries.iter().enumerate() {
                let _ = writeln!(out, "{:>3}. {:<40} {}", i + 1, e.key.to_string(), e.value);
            }
            entries.is_empty()
        }
        QueryOutput::Table { entries } => {
            for (key, value) in entries.iter() {
                let _ = writeln!(out, "     {:<40} {}", key.to_string(), value);
            }
            entries.is_empty()
        }
        QueryOutput::Argmax { entries } => {
            for (key, winner) in entries.iter() {
                let _ = writeln!(out, "     {:<20} {} ({})", key.to_string(), winner.value, winner.count);
            }
            entries.is_empty()
        }
        QueryOutput::Histogram { histogram } => {
            for bin in &histogram.bins {
                let _ = writeln!(out, "     [{:>7.2}, {:>7.2}) {}", bin.lower, bin.upper, bin.count);
            }
            histogram.is_empty()
        }
    };
    if empty {
        out.push_str("     (no data)\n");
    }
    out
}
