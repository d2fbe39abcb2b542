//! Grouped aggregation primitives.
//!
//! All of these are pure functions over borrowed rows. Rows whose group key
//! has a null component are skipped, so a group only exists if at least one
//! row contributed to it.

use std::collections::BTreeMap;

use crate::models::{
    AggregateResult, ArgmaxEntry, ArgmaxResult, Column, GroupKey, Histogram, HistogramBin, Ratio,
    Record, ValueColumn,
};

use super::Filter;

/// Build the group key of a row, or `None` if any component is null.
pub fn group_key<R: Record>(row: &R, group_by: &[Column]) -> Option<GroupKey> {
    group_by
        .iter()
        .map(|c| row.category(*c).map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .map(GroupKey::new)
}

/// Sum of `value` per group. Null values do not contribute.
pub fn group_sum<R: Record>(rows: &[R], group_by: &[Column], value: ValueColumn) -> AggregateResult<u64> {
    let mut result: AggregateResult<u64> = AggregateResult::new();
    for row in rows {
        let (Some(key), Some(v)) = (group_key(row, group_by), row.value(value)) else {
            continue;
        };
        let total = result.entry_mut(key);
        *total = total.saturating_add(v);
    }
    result
}

/// Number of rows per group satisfying `filter` (all rows when `None`).
pub fn group_count<R: Record>(rows: &[R], group_by: &[Column], filter: Option<&Filter>) -> AggregateResult<u64> {
    let mut result = AggregateResult::new();
    for row in rows {
        if filter.is_some_and(|f| !f.matches(row)) {
            continue;
        }
        if let Some(key) = group_key(row, group_by) {
            *result.entry_mut(key) += 1;
        }
    }
    result
}

/// Per-key `numerator / denominator` over the numerator's keys.
///
/// A key missing from the denominator counts as a zero denominator and
/// yields [`Ratio::Undefined`].
pub fn group_ratio(numerator: &AggregateResult<u64>, denominator: &AggregateResult<u64>) -> AggregateResult<Ratio> {
    numerator
        .iter()
        .map(|(key, n)| {
            let d = denominator.get(key).copied().unwrap_or(0);
            (key.clone(), Ratio::of(*n, d))
        })
        .collect()
}

/// For each `outer` group, the `inner` value with the most rows matching
/// `filter`. Ties go to the smaller inner value.
pub fn group_argmax<R: Record>(
    rows: &[R],
    outer: &[Column],
    inner: Column,
    filter: Option<&Filter>,
) -> ArgmaxResult {
    let mut counts: BTreeMap<GroupKey, BTreeMap<&str, u64>> = BTreeMap::new();
    for row in rows {
        if filter.is_some_and(|f| !f.matches(row)) {
            continue;
        }
        let (Some(key), Some(value)) = (group_key(row, outer), row.category(inner)) else {
            continue;
        };
        *counts.entry(key).or_default().entry(value).or_default() += 1;
    }

    counts
        .into_iter()
        .filter_map(|(key, inner_counts)| {
            // Ascending iteration plus strict `>` keeps the smallest value on ties.
            let mut best: Option<(&str, u64)> = None;
            for (value, count) in inner_counts {
                if best.map_or(true, |(_, c)| count > c) {
                    best = Some((value, count));
                }
            }
            best.map(|(value, count)| {
                (
                    key,
                    ArgmaxEntry {
                        value: value.to_string(),
                        count,
                    },
                )
            })
        })
        .collect()
}

/// Upper bound on histogram bin counts.
pub const MAX_BINS: usize = 1000;

/// Equal-width histogram of `value` spanning the observed range.
///
/// A single distinct value is centred in a range of width one. No values or
/// zero bins give an empty histogram. `bins` is capped at [`MAX_BINS`].
pub fn histogram<R: Record>(rows: &[R], value: ValueColumn, bins: usize) -> Histogram {
    let values: Vec<u64> = rows.iter().filter_map(|r| r.value(value)).collect();
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Histogram::default();
    };
    if bins == 0 {
        return Histogram::default();
    }
    let bins = bins.min(MAX_BINS);

    let (lower, upper) = if min == max {
        (min as f64 - 0.5, max as f64 + 0.5)
    } else {
        (min as f64, max as f64)
    };
    let width = (upper - lower) / bins as f64;

    let mut counts = vec![0u64; bins];
    for v in &values {
        let idx = (((*v as f64) - lower) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lower + width * i as f64,
                upper: lower + width * (i + 1) as f64,
                count,
            })
            .collect(),
        total: values.len() as u64,
    }
}
