//! Deterministic top-N selection.

use std::cmp::Ordering;

use crate::models::{AggregateResult, Entry, RankedTopN, Ratio};

/// A measure that can be ranked. `Greater` ranks higher.
pub trait Measure: Copy {
    fn rank_cmp(&self, other: &Self) -> Ordering;
}

impl Measure for u64 {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// Undefined ratios rank below every defined one.
impl Measure for Ratio {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Ratio::Defined(a), Ratio::Defined(b)) => a.total_cmp(b),
            (Ratio::Defined(_), Ratio::Undefined) => Ordering::Greater,
            (Ratio::Undefined, Ratio::Defined(_)) => Ordering::Less,
            (Ratio::Undefined, Ratio::Undefined) => Ordering::Equal,
        }
    }
}

/// The `n` highest entries: measure descending, ties by key ascending.
///
/// Returns every entry when fewer than `n` exist.
pub fn top_n<V: Measure>(aggregate: &AggregateResult<V>, n: usize) -> RankedTopN<V> {
    let mut entries: Vec<Entry<V>> = aggregate
        .iter()
        .map(|(key, value)| Entry {
            key: key.clone(),
            value: *value,
        })
        .collect();

    entries.sort_by(|a, b| b.value.rank_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    entries.truncate(n);
    RankedTopN::from_sorted(entries)
}

/// Clamp a signed limit from an outer surface; negatives mean "none".
pub fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}
