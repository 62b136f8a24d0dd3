//! Engine tuning knobs.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Grace period after an occurrence ends during which it is still relevant.
pub const DEFAULT_RELEVANCE_GRACE_MINUTES: i64 = 40;
/// Upper bound accepted for the relevance grace period (one week).
pub const MAX_RELEVANCE_GRACE_MINUTES: i64 = 7 * 24 * 60;
/// Day steps a daily series may take, counted from the first step that can
/// still be relevant, before generation gives up.
pub const DEFAULT_DAILY_CAP_DAYS: u32 = 36_525;
/// Week blocks a weekly series may visit before generation gives up.
pub const DEFAULT_WEEKLY_CAP_WEEKS: u32 = 1_000;
/// Month steps a monthly series may take before generation gives up.
pub const DEFAULT_MONTHLY_CAP_MONTHS: u32 = 500;

/// Configuration for an [`OccurrenceEngine`](crate::OccurrenceEngine).
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub relevance_grace_minutes: i64,
    pub daily_cap_days: u32,
    pub weekly_cap_weeks: u32,
    pub monthly_cap_months: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            relevance_grace_minutes: DEFAULT_RELEVANCE_GRACE_MINUTES,
            daily_cap_days: DEFAULT_DAILY_CAP_DAYS,
            weekly_cap_weeks: DEFAULT_WEEKLY_CAP_WEEKS,
            monthly_cap_months: DEFAULT_MONTHLY_CAP_MONTHS,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON object.
    ///
    /// # Errors
    /// Returns `OccurrenceError::InvalidConfig` if the JSON is malformed or
    /// `relevance_grace_minutes` is outside `0..=MAX_RELEVANCE_GRACE_MINUTES`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if !(0..=MAX_RELEVANCE_GRACE_MINUTES).contains(&config.relevance_grace_minutes) {
            let err = <serde_json::Error as serde::de::Error>::custom(format!(
                "relevance_grace_minutes must be between 0 and {}, got {}",
                MAX_RELEVANCE_GRACE_MINUTES, config.relevance_grace_minutes
            ));
            return Err(err.into());
        }
        Ok(config)
    }
}
