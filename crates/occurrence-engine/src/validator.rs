//! Checking that an occurrence ID names a future occurrence of a meeting.
//!
//! The check re-derives occurrences from the meeting's start, so it only
//! sees the first `max_occurrences_to_check` of them.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Result, ValidationFailure};
use crate::expander::OccurrenceEngine;
use crate::model::MeetingBase;

impl OccurrenceEngine {
    /// Validate `occurrence_id` against `meeting` as of `now`.
    ///
    /// # Errors
    /// Returns `OccurrenceError::Validation` when the meeting is missing, the
    /// ID is empty, `max_occurrences_to_check <= 0`, the ID is not among the
    /// first `max_occurrences_to_check` occurrences, or the occurrence starts
    /// before `now`.
    pub fn validate_future_occurrence_id_at(
        &self,
        meeting: Option<&MeetingBase>,
        occurrence_id: &str,
        max_occurrences_to_check: i32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let meeting = meeting.ok_or(ValidationFailure::MissingMeeting)?;
        if occurrence_id.is_empty() {
            return Err(ValidationFailure::EmptyOccurrenceId.into());
        }
        if max_occurrences_to_check <= 0 {
            return Err(ValidationFailure::NonPositiveHorizon(max_occurrences_to_check).into());
        }

        let occurrences = self.calculate_occurrences(Some(meeting), max_occurrences_to_check);
        let found = occurrences
            .iter()
            .find(|o| o.occurrence_id == occurrence_id)
            .ok_or_else(|| ValidationFailure::NotFound(occurrence_id.to_string()))?;

        if found.start_time < now {
            debug!(occurrence_id, start = %found.start_time, "occurrence is in the past");
            return Err(ValidationFailure::PastOccurrence {
                id: occurrence_id.to_string(),
                start: found.start_time,
            }
            .into());
        }
        Ok(())
    }

    /// Validate `occurrence_id` against `meeting` as of the current time.
    ///
    /// # Errors
    /// See [`OccurrenceEngine::validate_future_occurrence_id_at`].
    pub fn validate_future_occurrence_id(
        &self,
        meeting: Option<&MeetingBase>,
        occurrence_id: &str,
        max_occurrences_to_check: i32,
    ) -> Result<()> {
        self.validate_future_occurrence_id_at(
            meeting,
            occurrence_id,
            max_occurrences_to_check,
            Utc::now(),
        )
    }
}

/// [`OccurrenceEngine::validate_future_occurrence_id`] with the default configuration.
///
/// # Errors
/// See [`OccurrenceEngine::validate_future_occurrence_id_at`].
pub fn validate_future_occurrence_id(
    meeting: Option<&MeetingBase>,
    occurrence_id: &str,
    max_occurrences_to_check: i32,
) -> Result<()> {
    OccurrenceEngine::default().validate_future_occurrence_id(
        meeting,
        occurrence_id,
        max_occurrences_to_check,
    )
}

/// [`OccurrenceEngine::validate_future_occurrence_id_at`] with the default configuration.
///
/// # Errors
/// See [`OccurrenceEngine::validate_future_occurrence_id_at`].
pub fn validate_future_occurrence_id_at(
    meeting: Option<&MeetingBase>,
    occurrence_id: &str,
    max_occurrences_to_check: i32,
    now: DateTime<Utc>,
) -> Result<()> {
    OccurrenceEngine::default().validate_future_occurrence_id_at(
        meeting,
        occurrence_id,
        max_occurrences_to_check,
        now,
    )
}
