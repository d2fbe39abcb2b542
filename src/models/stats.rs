//! Aggregate result models.

use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One or more categorical values identifying a group.
///
/// Ordered component by component, so single-column keys sort as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    pub fn new(parts: Vec<String>) -> Self {
        Self(parts)
    }

    pub fn single(part: impl Into<String>) -> Self {
        Self(vec![part.into()])
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        Self::single(s)
    }
}

impl From<&[&str]> for GroupKey {
    fn from(parts: &[&str]) -> Self {
        Self(parts.iter().map(|p| p.to_string()).collect())
    }
}

/// A ratio between two aggregates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Defined(f64),
    /// The denominator was zero.
    Undefined,
}

impl Ratio {
    pub fn of(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(numerator as f64 / denominator as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Ratio::Undefined)
    }
}

/// Serialized as a number, or `null` when undefined.
impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Blank when undefined.
impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{:.2}", v),
            Ratio::Undefined => Ok(()),
        }
    }
}

/// A (key, measure) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<V> {
    pub key: GroupKey,
    pub value: V,
}

/// Mapping from group key to measure. Iteration is by key ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult<V> {
    entries: BTreeMap<GroupKey, V>,
}

impl<V> AggregateResult<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &GroupKey) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &GroupKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &V)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.entries.keys()
    }

    pub(crate) fn entry_mut(&mut self, key: GroupKey) -> &mut V
    where
        V: Default,
    {
        self.entries.entry(key).or_default()
    }
}

impl<V> Default for AggregateResult<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(GroupKey, V)> for AggregateResult<V> {
    fn from_iter<I: IntoIterator<Item = (GroupKey, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<V: Serialize> Serialize for AggregateResult<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|(key, value)| Entry {
            key: key.clone(),
            value,
        }))
    }
}

/// Entries sorted by measure descending, ties by key ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedTopN<V> {
    entries: Vec<Entry<V>>,
}

impl<V> RankedTopN<V> {
    pub(crate) fn from_sorted(entries: Vec<Entry<V>>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry<V>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<V>> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<Entry<V>> {
        self.entries
    }
}

/// The winning inner value of one outer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgmaxEntry {
    pub value: String,
    pub count: u64,
}

/// Outer group key to its dominant inner value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgmaxResult {
    winners: BTreeMap<GroupKey, ArgmaxEntry>,
}

impl ArgmaxResult {
    pub fn get(&self, key: &GroupKey) -> Option<&ArgmaxEntry> {
        self.winners.get(key)
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &ArgmaxEntry)> {
        self.winners.iter()
    }
}

impl FromIterator<(GroupKey, ArgmaxEntry)> for ArgmaxResult {
    fn from_iter<I: IntoIterator<Item = (GroupKey, ArgmaxEntry)>>(iter: I) -> Self {
        Self {
            winners: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ArgmaxResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Row<'a>(&'a GroupKey, &'a ArgmaxEntry);

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut s = serializer.serialize_struct("ArgmaxRow", 3)?;
                s.serialize_field("key", self.0)?;
                s.serialize_field("value", &self.1.value)?;
                s.serialize_field("count", &self.1.count)?;
                s.end()
            }
        }

        serializer.collect_seq(self.winners.iter().map(|(k, v)| Row(k, v)))
    }
}

/// Half-open bin `[lower, upper)`; the last bin also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Equal-width histogram.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub total: u64,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Row counts for one prepared dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub matches: usize,
    pub events: usize,
    /// Events whose match id is absent from the matches table
    pub unmatched_events: usize,
    pub seasons: usize,
}
