//! Error types for occurrence-engine operations.
//!
//! Occurrence generation itself never fails: malformed input degrades to an
//! empty result. Only occurrence validation and configuration loading report
//! errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OccurrenceError {
    /// A rejected call to occurrence validation. The wrapped detail says why.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl OccurrenceError {
    /// The validation detail, if this is a validation error.
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            OccurrenceError::Validation(failure) => Some(failure),
            OccurrenceError::InvalidConfig(_) => None,
        }
    }
}

/// Reasons an occurrence ID can be rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("meeting is required")]
    MissingMeeting,

    #[error("occurrence ID is required")]
    EmptyOccurrenceId,

    #[error("max occurrences to check must be positive, got {0}")]
    NonPositiveHorizon(i32),

    #[error("occurrence {0} not found for meeting")]
    NotFound(String),

    #[error("occurrence {id} started at {start} and is in the past")]
    PastOccurrence { id: String, start: DateTime<Utc> },
}

pub type Result<T> = std::result::Result<T, OccurrenceError>;
