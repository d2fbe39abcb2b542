//! Left join of deliveries onto matches.

use std::borrow::Cow;
use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::models::{EventRecord, JoinedEvent, MatchRecord};
use crate::schema::canonical_match_id;

/// The "one" side of the join is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinIntegrityError {
    #[error("duplicate match_id `{key}` in matches table (rows {first_row} and {duplicate_row})")]
    DuplicateKey {
        key: String,
        first_row: usize,
        duplicate_row: usize,
    },
}

/// Index matches by canonical id, rejecting duplicates.
pub fn index_matches(
    matches: &[MatchRecord],
) -> Result<HashMap<Cow<'_, str>, (usize, &MatchRecord)>, JoinIntegrityError> {
    let mut index: HashMap<Cow<'_, str>, (usize, &MatchRecord)> = HashMap::with_capacity(matches.len());
    for (row, m) in matches.iter().enumerate() {
        if let Some((first_row, _)) = index.insert(canonical_match_id(&m.match_id), (row, m)) {
            return Err(JoinIntegrityError::DuplicateKey {
                key: m.match_id.clone(),
                first_row,
                duplicate_row: row,
            });
        }
    }
    Ok(index)
}

/// Attach season, venue and winner to every delivery.
///
/// Output has exactly one row per input event, in input order. Events whose
/// match is missing keep `None` match attributes.
pub fn left_join(events: &[EventRecord], matches: &[MatchRecord]) -> Result<Vec<JoinedEvent>, JoinIntegrityError> {
    let index = index_matches(matches)?;

    let joined: Vec<JoinedEvent> = events
        .iter()
        .map(|e| {
            let found = index
                .get(&*canonical_match_id(&e.match_id))
                .map(|(_, m)| *m);
            JoinedEvent::new(e.clone(), found)
        })
        .collect();

    let unmatched = joined.iter().filter(|j| !j.is_matched()).count();
    debug!(
        "Joined {} events onto {} matches ({} unmatched)",
        joined.len(),
        matches.len(),
        unmatched
    );

    Ok(joined)
}
