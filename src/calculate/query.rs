//! Declarative query descriptions and the single engine that runs them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    AggregateResult, ArgmaxResult, Column, Histogram, JoinedEvent, MatchRecord, RankedTopN, Ratio,
    Record, Source, ValueColumn,
};

use super::{group_argmax, group_count, group_ratio, group_sum, histogram, top_n, Filter, MAX_BINS};

/// Invalid query descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("column `{column}` is not available on the {table} table")]
    ColumnUnavailable { column: Column, table: Source },

    #[error("value column `{column}` is not available on the {table} table")]
    ValueUnavailable { column: ValueColumn, table: Source },

    #[error("filter reads delivery data but the query runs on the {table} table")]
    FilterUnavailable { table: Source },

    #[error("group key must name at least one column")]
    EmptyGroupKey,

    #[error("ratio numerator groups by {numerator} column(s) but denominator by {denominator}")]
    KeyArityMismatch { numerator: usize, denominator: usize },

    #[error("histogram bins must be between 1 and {max}, got {bins}")]
    InvalidBins { bins: usize, max: usize },
}

/// What to compute per group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    Sum { value: ValueColumn },
    Count,
}

/// A grouped sum or count over one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub source: Source,
    pub group_by: Vec<Column>,
    pub metric: Metric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl Aggregation {
    pub fn sum(source: Source, group_by: Vec<Column>, value: ValueColumn) -> Self {
        Self {
            source,
            group_by,
            metric: Metric::Sum { value },
            filter: None,
        }
    }

    pub fn count(source: Source, group_by: Vec<Column>) -> Self {
        Self {
            source,
            group_by,
            metric: Metric::Count,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.group_by.is_empty() {
            return Err(QueryError::EmptyGroupKey);
        }
        check_columns(self.source, &self.group_by)?;
        if let Metric::Sum { value } = self.metric {
            check_value(self.source, value)?;
        }
        check_filter(self.source, self.filter.as_ref())
    }

    fn run<R: Record>(&self, rows: &[R]) -> AggregateResult<u64> {
        match self.metric {
            Metric::Sum { value } => {
                let kept: Vec<&R> = match &self.filter {
                    Some(f) => rows.iter().filter(|r| f.matches(*r)).collect(),
                    None => rows.iter().collect(),
                };
                group_sum(&kept, &self.group_by, value)
            }
            Metric::Count => group_count(rows, &self.group_by, self.filter.as_ref()),
        }
    }

    fn execute(&self, matches: &[MatchRecord], events: &[JoinedEvent]) -> AggregateResult<u64> {
        match self.source {
            Source::Matches => self.run(matches),
            Source::Events => self.run(events),
        }
    }
}

/// One analysis over the prepared dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    /// Top `limit` groups of an aggregation.
    Ranked { aggregation: Aggregation, limit: usize },

    /// Top `limit` groups of `numerator / denominator`.
    Ratio {
        numerator: Aggregation,
        denominator: Aggregation,
        limit: usize,
    },

    /// Every group, ordered by key.
    Table { aggregation: Aggregation },

    /// Dominant `inner` value per `outer` group.
    Argmax {
        source: Source,
        outer: Vec<Column>,
        inner: Column,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Filter>,
    },

    Histogram {
        source: Source,
        value: ValueColumn,
        bins: usize,
    },
}

/// Result of running a [`Query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryOutput {
    Ranked { entries: RankedTopN<u64> },
    Ratio { entries: RankedTopN<Ratio> },
    Table { entries: AggregateResult<u64> },
    Argmax { entries: ArgmaxResult },
    Histogram { histogram: Histogram },
}

impl Query {
    pub fn validate(&self) -> Result<(), QueryError> {
        match self {
            Query::Ranked { aggregation, .. } | Query::Table { aggregation } => aggregation.validate(),
            Query::Ratio {
                numerator,
                denominator,
                ..
            } => {
                numerator.validate()?;
                denominator.validate()?;
                if numerator.group_by.len() != denominator.group_by.len() {
                    return Err(QueryError::KeyArityMismatch {
                        numerator: numerator.group_by.len(),
                        denominator: denominator.group_by.len(),
                    });
                }
                Ok(())
            }
            Query::Argmax {
                source,
                outer,
                inner,
                filter,
            } => {
                if outer.is_empty() {
                    return Err(QueryError::EmptyGroupKey);
                }
                check_columns(*source, outer)?;
                check_columns(*source, std::slice::from_ref(inner))?;
                check_filter(*source, filter.as_ref())
            }
            Query::Histogram { source, value, bins } => {
                if *bins == 0 || *bins > MAX_BINS {
                    return Err(QueryError::InvalidBins {
                        bins: *bins,
                        max: MAX_BINS,
                    });
                }
                check_value(*source, *value)
            }
        }
    }

    /// Replace the row limit of ranked queries; other kinds are unchanged.
    pub fn with_limit(mut self, new_limit: usize) -> Self {
        if let Query::Ranked { limit, .. } | Query::Ratio { limit, .. } = &mut self {
            *limit = new_limit;
        }
        self
    }

    /// Validate, then run against the prepared tables.
    pub fn execute(&self, matches: &[MatchRecord], events: &[JoinedEvent]) -> Result<QueryOutput, QueryError> {
        self.validate()?;

        let output = match self {
            Query::Ranked { aggregation, limit } => QueryOutput::Ranked {
                entries: top_n(&aggregation.execute(matches, events), *limit),
            },
            Query::Ratio {
                numerator,
                denominator,
                limit,
            } => {
                let ratio = group_ratio(
                    &numerator.execute(matches, events),
                    &denominator.execute(matches, events),
                );
                QueryOutput::Ratio {
                    entries: top_n(&ratio, *limit),
                }
            }
            Query::Table { aggregation } => QueryOutput::Table {
                entries: aggregation.execute(matches, events),
            },
            Query::Argmax {
                source,
                outer,
                inner,
                filter,
            } => {
                let entries = match source {
                    Source::Matches => group_argmax(matches, outer, *inner, filter.as_ref()),
                    Source::Events => group_argmax(events, outer, *inner, filter.as_ref()),
                };
                QueryOutput::Argmax { entries }
            }
            Query::Histogram {
                source,
                value,
                bins,
            } => {
                let histogram = match source {
                    Source::Matches => histogram(matches, *value, *bins),
                    Source::Events => histogram(events, *value, *bins),
                };
                QueryOutput::Histogram { histogram }
            }
        };

        Ok(output)
    }
}

fn check_columns(source: Source, columns: &[Column]) -> Result<(), QueryError> {
    match columns.iter().find(|c| !c.available_on(source)) {
        Some(column) => Err(QueryError::ColumnUnavailable {
            column: *column,
            table: source,
        }),
        None => Ok(()),
    }
}

fn check_value(source: Source, value: ValueColumn) -> Result<(), QueryError> {
    if value.available_on(source) {
        Ok(())
    } else {
        Err(QueryError::ValueUnavailable {
            column: value,
            table: source,
        })
    }
}

fn check_filter(source: Source, filter: Option<&Filter>) -> Result<(), QueryError> {
    let Some(filter) = filter else {
        return Ok(());
    };
    if source == Source::Matches && filter.needs_events() {
        return Err(QueryError::FilterUnavailable { table: source });
    }
    check_columns(source, &filter.columns())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRecord, GroupKey};

    fn sample() -> (Vec<MatchRecord>, Vec<JoinedEvent>) {
        let matches = vec![
            MatchRecord::new("1", "2017").with_winner("SRH"),
            MatchRecord::new("2", "2018").with_winner("CSK"),
        ];
        let events = vec![
            EventRecord::new("1", "Warner", "Mills", 4),
            EventRecord::new("1", "Warner", "Mills", 0).with_dismissal("caught"),
            EventRecord::new("2", "Raina", "Bumrah", 6).with_extras(1),
            EventRecord::new("2", "Raina", "Bumrah", 0).with_dismissal("run out"),
            EventRecord::new("3", "Dhoni", "Bumrah", 2),
        ];
        let joined = crate::join::left_join(&events, &matches).unwrap();
        (matches, joined)
    }

    #[test]
    fn test_ranked_sum() {
        let (matches, events) = sample();
        let query = Query::Ranked {
            aggregation: Aggregation::sum(Source::Events, vec![Column::ActorPrimary], ValueColumn::PrimaryRuns),
            limit: 2,
        };
        let QueryOutput::Ranked { entries } = query.execute(&matches, &events).unwrap() else {
            panic!("expected ranked output");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.entries()[0].key, GroupKey::single("Raina"));
        assert_eq!(entries.entries()[0].value, 6);
        assert_eq!(entries.entries()[1].key, GroupKey::single("Warner"));
    }

    #[test]
    fn test_sum_with_filter() {
        let (matches, events) = sample();
        let query = Query::Table {
            aggregation: Aggregation::sum(Source::Events, vec![Column::Season], ValueColumn::TotalRuns)
                .with_filter(Filter::NotNull { column: Column::Season }),
        };
        let QueryOutput::Table { entries } = query.execute(&matches, &events).unwrap() else {
            panic!("expected table output");
        };
        assert_eq!(entries.get(&GroupKey::single("2017")), Some(&4));
        assert_eq!(entries.get(&GroupKey::single("2018")), Some(&7));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_ratio_query() {
        let (matches, events) = sample();
        let query = Query::Ratio {
            numerator: Aggregation::sum(Source::Events, vec![Column::ActorPrimary], ValueColumn::PrimaryRuns),
            denominator: Aggregation::count(Source::Events, vec![Column::DismissedActor])
                .with_filter(Filter::DismissalOccurred),
            limit: 10,
        };
        let QueryOutput::Ratio { entries } = query.execute(&matches, &events).unwrap() else {
            panic!("expected ratio output");
        };
        let values: Vec<(String, Option<f64>)> = entries
            .iter()
            .map(|e| (e.key.to_string(), e.value.value()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("Raina".to_string(), Some(6.0)),
                ("Warner".to_string(), Some(4.0)),
                ("Dhoni".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_argmax_query() {
        let (matches, events) = sample();
        let query = Query::Argmax {
            source: Source::Events,
            outer: vec![Column::Season],
            inner: Column::ActorSecondary,
            filter: None,
        };
        let QueryOutput::Argmax { entries } = query.execute(&matches, &events).unwrap() else {
            panic!("expected argmax output");
        };
        // Match 3 has no season, so Dhoni's delivery is not counted.
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get(&GroupKey::single("2018")).unwrap().value, "Bumrah");
        assert_eq!(entries.get(&GroupKey::single("2018")).unwrap().count, 2);
    }

    #[test]
    fn test_validate_unavailable_column() {
        let query = Query::Table {
            aggregation: Aggregation::count(Source::Matches, vec![Column::ActorPrimary]),
        };
        assert_eq!(
            query.validate(),
            Err(QueryError::ColumnUnavailable {
                column: Column::ActorPrimary,
                table: Source::Matches
            })
        );
    }

    #[test]
    fn test_validate_unavailable_value() {
        let query = Query::Histogram {
            source: Source::Events,
            value: ValueColumn::WinByRuns,
            bins: 10,
        };
        assert!(matches!(query.validate(), Err(QueryError::ValueUnavailable { .. })));
    }

    #[test]
    fn test_validate_histogram_bins() {
        let histogram = |bins| Query::Histogram {
            source: Source::Matches,
            value: ValueColumn::WinByRuns,
            bins,
        };

        assert_eq!(histogram(1).validate(), Ok(()));
        assert_eq!(histogram(MAX_BINS).validate(), Ok(()));
        assert_eq!(
            histogram(0).validate(),
            Err(QueryError::InvalidBins { bins: 0, max: MAX_BINS })
        );
        assert_eq!(
            histogram(usize::MAX).validate(),
            Err(QueryError::InvalidBins {
                bins: usize::MAX,
                max: MAX_BINS
            })
        );
        assert!(histogram(usize::MAX)
            .execute(&[MatchRecord::new("1", "2017")], &[])
            .is_err());
    }

    #[test]
    fn test_validate_event_filter_on_matches() {
        let query = Query::Table {
            aggregation: Aggregation::count(Source::Matches, vec![Column::Season])
                .with_filter(Filter::WicketCredited),
        };
        assert_eq!(
            query.validate(),
            Err(QueryError::FilterUnavailable { table: Source::Matches })
        );
    }

    #[test]
    fn test_validate_empty_group_key() {
        let query = Query::Ranked {
            aggregation: Aggregation::count(Source::Events, vec![]),
            limit: 5,
        };
        assert_eq!(query.validate(), Err(QueryError::EmptyGroupKey));
    }

    #[test]
    fn test_validate_ratio_arity() {
        let query = Query::Ratio {
            numerator: Aggregation::count(Source::Events, vec![Column::ActorPrimary]),
            denominator: Aggregation::count(Source::Events, vec![Column::MatchId, Column::ActorPrimary]),
            limit: 5,
        };
        assert!(matches!(query.validate(), Err(QueryError::KeyArityMismatch { .. })));
    }

    #[test]
    fn test_with_limit() {
        let query = Query::Ranked {
            aggregation: Aggregation::count(Source::Events, vec![Column::ActorSecondary]),
            limit: 10,
        }
        .with_limit(3);
        assert!(matches!(query, Query::Ranked { limit: 3, .. }));

        let hist = Query::Histogram {
            source: Source::Matches,
            value: ValueColumn::WinByRuns,
            bins: 30,
        };
        assert_eq!(hist.clone().with_limit(3), hist);
    }

    #[test]
    fn test_query_deserialize_from_toml() {
        let query: Query = toml::from_str(
            r#"
            kind = "ranked"
            limit = 10

            [aggregation]
            source = "events"
            group_by = ["bowler"]
            metric = { kind = "count" }
            filter = { kind = "wicket_credited" }
            "#,
        )
        .unwrap();

        assert_eq!(
            query,
            Query::Ranked {
                aggregation: Aggregation::count(Source::Events, vec![Column::ActorSecondary])
                    .with_filter(Filter::WicketCredited),
                limit: 10,
            }
        );
    }

    #[test]
    fn test_output_serialization() {
        let (matches, events) = sample();
        let query = Query::Histogram {
            source: Source::Matches,
            value: ValueColumn::WinByRuns,
            bins: 3,
        };
        let json = serde_json::to_value(query.execute(&matches, &events).unwrap()).unwrap();
        assert_eq!(json["kind"], "histogram");
        assert_eq!(json["histogram"]["total"], 2);
    }
}
