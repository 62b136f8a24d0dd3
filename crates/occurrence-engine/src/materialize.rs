//! Turning candidate instants into [`Occurrence`] records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::{MeetingBase, Occurrence};

/// Stable identity for an occurrence starting at `start`: its Unix epoch
/// seconds as a decimal string.
pub fn occurrence_id(start: DateTime<Utc>) -> String {
    start.timestamp().to_string()
}

/// Recover the start instant from an occurrence ID, for display.
pub fn occurrence_start(id: &str) -> Option<DateTime<Utc>> {
    let secs = id.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// Cancellation flags from a meeting's previously cached occurrences, by ID.
#[derive(Debug, Default)]
pub struct CancellationLookup<'a> {
    cancelled: HashMap<&'a str, bool>,
}

impl<'a> CancellationLookup<'a> {
    pub fn new(cached: &'a [Occurrence]) -> Self {
        Self {
            cancelled: cached
                .iter()
                .map(|o| (o.occurrence_id.as_str(), o.is_cancelled))
                .collect(),
        }
    }

    /// `false` for IDs that were never cached.
    pub fn is_cancelled(&self, id: &str) -> bool {
        self.cancelled.get(id).copied().unwrap_or(false)
    }
}

/// Build the occurrence of `meeting` that starts at `start`.
pub fn materialize(
    meeting: &MeetingBase,
    start: DateTime<Utc>,
    cancellations: &CancellationLookup<'_>,
) -> Occurrence {
    let id = occurrence_id(start);
    let is_cancelled = cancellations.is_cancelled(&id);
    Occurrence {
        occurrence_id: id,
        start_time: start,
        title: meeting.title.clone(),
        description: meeting.description.clone(),
        duration: meeting.duration,
        registrant_count: meeting.registrant_count,
        response_count_yes: 0,
        response_count_no: 0,
        response_count_maybe: 0,
        is_cancelled,
        recurrence: None,
    }
}
