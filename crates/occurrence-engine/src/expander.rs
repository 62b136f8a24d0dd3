//! Occurrence expansion -- meeting snapshot in, ordered occurrences out.
//!
//! Order of operations, which callers rely on:
//!
//! 1. generate candidates for the rule (bounded by `end_date_time` and the safety cap)
//! 2. drop candidates that are not relevant at the reference instant
//! 3. stop at `limit`
//! 4. cap the returned list at `end_times`
//!
//! Step 4 caps the filtered list, not the series. With a reference instant
//! later than the anchor, `end_times` counts from the first relevant
//! occurrence rather than from the start of the series.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::generator::Candidates;
use crate::materialize::{materialize, CancellationLookup};
use crate::model::{MeetingBase, Occurrence};
use crate::relevance::is_relevant;
use crate::tz::load_timezone;

/// Result of an expansion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    /// Occurrences in chronological order.
    pub occurrences: Vec<Occurrence>,
    /// `true` if a safety cap stopped generation before `limit` was reached.
    pub truncated: bool,
}

/// Computes occurrences with a given [`EngineConfig`].
///
/// The engine holds no mutable state; one instance can serve any number of
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccurrenceEngine {
    config: EngineConfig,
}

impl OccurrenceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Expand `meeting` into at most `limit` occurrences relevant at `from`.
    ///
    /// Returns an empty expansion for `limit <= 0` or an unrecognized
    /// recurrence type.
    pub fn expand(&self, meeting: &MeetingBase, from: DateTime<Utc>, limit: i32) -> Expansion {
        let Ok(limit) = usize::try_from(limit) else {
            return Expansion::default();
        };
        if limit == 0 {
            return Expansion::default();
        }

        let cancellations = CancellationLookup::new(&meeting.occurrences);
        let relevant = |start: DateTime<Utc>| {
            is_relevant(
                start,
                meeting.duration,
                from,
                self.config.relevance_grace_minutes,
            )
        };

        let Some(rule) = &meeting.recurrence else {
            let occurrences = if relevant(meeting.start_time) {
                vec![materialize(meeting, meeting.start_time, &cancellations)]
            } else {
                Vec::new()
            };
            return Expansion {
                occurrences,
                truncated: false,
            };
        };

        let Some(kind) = rule.kind() else {
            debug!(
                recurrence_type = rule.recurrence_type,
                "unrecognized recurrence type, no occurrences"
            );
            return Expansion::default();
        };

        let tz = load_timezone(&meeting.timezone);
        let mut candidates = Candidates::new(kind, rule, meeting.start_time, tz, &self.config);
        // Anything starting before `from - (duration + grace)` cannot be relevant.
        let lookback =
            i64::from(meeting.duration).saturating_add(self.config.relevance_grace_minutes);
        if let Some(earliest) = Duration::try_minutes(lookback)
            .and_then(|span| from.checked_sub_signed(span))
        {
            candidates.skip_to(earliest.min(from));
        }

        let mut occurrences = Vec::new();
        for start in candidates.by_ref() {
            if !relevant(start) {
                continue;
            }
            occurrences.push(materialize(meeting, start, &cancellations));
            if occurrences.len() >= limit {
                break;
            }
        }
        let truncated = candidates.truncated();

        if let Ok(end_times) = usize::try_from(rule.end_times) {
            if end_times > 0 {
                occurrences.truncate(end_times);
            }
        }

        debug!(
            ?kind,
            timezone = %tz,
            count = occurrences.len(),
            truncated,
            "expanded occurrences"
        );

        Expansion {
            occurrences,
            truncated,
        }
    }

    /// Occurrences of `meeting` from its own start time.
    pub fn calculate_occurrences(&self, meeting: Option<&MeetingBase>, limit: i32) -> Vec<Occurrence> {
        match meeting {
            Some(m) => self.calculate_occurrences_from_date(Some(m), m.start_time, limit),
            None => Vec::new(),
        }
    }

    /// Occurrences of `meeting` that are relevant at `from_date`.
    ///
    /// Never fails: a missing meeting or a non-positive `limit` yields an
    /// empty list.
    pub fn calculate_occurrences_from_date(
        &self,
        meeting: Option<&MeetingBase>,
        from_date: DateTime<Utc>,
        limit: i32,
    ) -> Vec<Occurrence> {
        match meeting {
            Some(m) => self.expand(m, from_date, limit).occurrences,
            None => Vec::new(),
        }
    }
}

/// [`OccurrenceEngine::calculate_occurrences`] with the default configuration.
pub fn calculate_occurrences(meeting: Option<&MeetingBase>, limit: i32) -> Vec<Occurrence> {
    OccurrenceEngine::default().calculate_occurrences(meeting, limit)
}

/// [`OccurrenceEngine::calculate_occurrences_from_date`] with the default configuration.
pub fn calculate_occurrences_from_date(
    meeting: Option<&MeetingBase>,
    from_date: DateTime<Utc>,
    limit: i32,
) -> Vec<Occurrence> {
    OccurrenceEngine::default().calculate_occurrences_from_date(meeting, from_date, limit)
}

/// [`OccurrenceEngine::expand`] with the default configuration.
pub fn expand(meeting: &MeetingBase, from: DateTime<Utc>, limit: i32) -> Expansion {
    OccurrenceEngine::default().expand(meeting, from, limit)
}
