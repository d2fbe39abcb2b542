//! Canonical column names and the source names accepted for each.

use std::collections::HashMap;

use crate::models::RawTable;

/// Canonical match columns.
pub const MATCH_COLUMNS: [&str; 6] = [
    "match_id",
    "season",
    "venue",
    "winner",
    "win_by_runs",
    "win_by_wickets",
];

/// Canonical event columns.
pub const EVENT_COLUMNS: [&str; 8] = [
    "match_id",
    "actor_primary",
    "actor_secondary",
    "primary_runs",
    "extra_runs",
    "dismissal_occurred",
    "dismissal_kind",
    "dismissed_actor",
];

/// Accepted source names per canonical column, in preference order.
const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("match_id", &["match_id", "id", "matchid"]),
    ("season", &["season"]),
    ("venue", &["venue", "ground"]),
    ("winner", &["winner", "winning_team"]),
    ("win_by_runs", &["win_by_runs"]),
    ("win_by_wickets", &["win_by_wickets"]),
    ("actor_primary", &["actor_primary", "batsman", "batter", "striker"]),
    ("actor_secondary", &["actor_secondary", "bowler"]),
    (
        "primary_runs",
        &["primary_runs", "batsman_runs", "batter_runs", "runs_off_bat"],
    ),
    ("extra_runs", &["extra_runs", "extras"]),
    ("dismissal_occurred", &["dismissal_occurred", "is_wicket"]),
    ("dismissal_kind", &["dismissal_kind", "wicket_type"]),
    ("dismissed_actor", &["dismissed_actor", "player_dismissed"]),
];

/// The single alias table every table goes through.
#[derive(Debug, Clone)]
pub struct AliasTable {
    aliases: HashMap<String, Vec<String>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let aliases = DEFAULT_ALIASES
            .iter()
            .map(|(canonical, names)| {
                (
                    canonical.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect();
        Self { aliases }
    }
}

impl AliasTable {
    /// Whether `name` is a canonical column of either table.
    pub fn is_canonical(name: &str) -> bool {
        MATCH_COLUMNS.contains(&name) || EVENT_COLUMNS.contains(&name)
    }

    /// Append extra source names after the defaults.
    ///
    /// Keys that are not canonical column names are ignored; configuration
    /// validation reports them.
    pub fn with_extra(mut self, extra: &HashMap<String, Vec<String>>) -> Self {
        for (canonical, names) in extra {
            if let Some(existing) = self.aliases.get_mut(canonical.as_str()) {
                for name in names {
                    if !existing.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                        existing.push(name.clone());
                    }
                }
            }
        }
        self
    }

    pub fn aliases_for(&self, canonical: &str) -> &[String] {
        self.aliases
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Column index of `canonical` in `table`, earliest alias first.
    pub fn resolve(&self, table: &RawTable, canonical: &str) -> Option<usize> {
        self.aliases_for(canonical)
            .iter()
            .find_map(|alias| table.column_index(alias))
    }
}
