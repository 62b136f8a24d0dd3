//! # occurrence-engine
//!
//! Deterministic expansion of recurring meetings into concrete occurrences.
//!
//! Given a meeting's anchor start time, duration, timezone, and optional
//! recurrence rule, the engine produces the ordered occurrences the rule
//! implies, bounded by the rule's end conditions, a reference instant, and a
//! result limit. Each occurrence carries a stable ID (its start as Unix epoch
//! seconds) that stays the same across recomputation.
//!
//! ## Modules
//!
//! - [`expander`] - meeting snapshot → ordered occurrences
//! - [`generator`] - daily, weekly, and monthly candidate sequences
//! - [`calendar`] - weekday numbering, month lengths, nth/last weekday
//! - [`relevance`] - the "still relevant" test with its grace period
//! - [`materialize`] - occurrence IDs and carried-over cancellation flags
//! - [`validator`] - confirm an occurrence ID refers to a future occurrence
//! - [`tz`] - timezone loading and wall-clock resolution across DST
//! - [`config`] - engine configuration
//! - [`model`] - meeting, recurrence, and occurrence types
//! - [`error`] - error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod expander;
pub mod generator;
pub mod materialize;
pub mod model;
pub mod relevance;
pub mod tz;
pub mod validator;

pub use config::EngineConfig;
pub use error::{OccurrenceError, ValidationFailure};
pub use expander::{
    calculate_occurrences, calculate_occurrences_from_date, expand, Expansion, OccurrenceEngine,
};
pub use materialize::{occurrence_id, occurrence_start};
pub use model::{MeetingBase, Occurrence, Recurrence, RecurrenceType};
pub use validator::{validate_future_occurrence_id, validate_future_occurrence_id_at};
