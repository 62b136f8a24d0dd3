//! Relevance test: is an occurrence still worth showing at a reference instant?
//!
//! An occurrence is relevant if it starts at or after the reference instant,
//! or if it is still running (plus a grace period) at that instant.

use chrono::{DateTime, Duration, Utc};

/// `true` if an occurrence starting at `start` and lasting `duration_minutes`
/// is relevant at `reference`.
///
/// Relevant means `start >= reference`, or
/// `start + duration + grace > reference`. An end that overflows the
/// representable range counts as relevant when the offset is positive.
pub fn is_relevant(
    start: DateTime<Utc>,
    duration_minutes: i32,
    reference: DateTime<Utc>,
    grace_minutes: i64,
) -> bool {
    if start >= reference {
        return true;
    }
    let Some(minutes) = i64::from(duration_minutes).checked_add(grace_minutes) else {
        return grace_minutes > 0;
    };
    let Some(span) = Duration::try_minutes(minutes) else {
        return minutes > 0;
    };
    match start.checked_add_signed(span) {
        Some(effective_end) => effective_end > reference,
        None => minutes > 0,
    }
}
