//! Timezone loading and wall-clock resolution.
//!
//! Occurrences keep the anchor's local time-of-day across DST changes. When
//! that wall-clock time does not exist on a given date (spring-forward gap)
//! it is shifted forward by the length of the gap; when it exists twice
//! (fall-back overlap) the earlier instant is used.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use tracing::warn;

/// Load an IANA timezone by name, falling back to UTC for unknown names.
pub fn load_timezone(name: &str) -> Tz {
    if name.is_empty() {
        return Tz::UTC;
    }
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!(timezone = %name, "unknown timezone, falling back to UTC");
            Tz::UTC
        }
    }
}

/// Resolve a local wall-clock time in `tz` to a concrete instant.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Interpret the wall-clock time with the offset in force before the gap.
            let before = tz
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix();
            let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}
