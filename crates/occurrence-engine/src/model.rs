//! Meeting snapshot, recurrence rule, and occurrence types.
//!
//! These mirror the records exchanged with the surrounding meeting service.
//! All of them serialize with snake_case field names; instants are RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar;

/// Recurrence pattern kinds, by their wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceType {
    Daily = 1,
    Weekly = 2,
    Monthly = 3,
}

impl RecurrenceType {
    /// Map a wire code to a pattern kind. Unknown codes have no pattern.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(RecurrenceType::Daily),
            2 => Some(RecurrenceType::Weekly),
            3 => Some(RecurrenceType::Monthly),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

/// A frozen description of how a meeting's anchor instant repeats.
///
/// Numeric fields keep their wire representation (`0` means "unset"), so a
/// snapshot that round-trips through this type is unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recurrence {
    /// Pattern code: 1 = daily, 2 = weekly, 3 = monthly.
    #[serde(rename = "type")]
    pub recurrence_type: i32,
    /// Step between occurrences, in days, weeks, or months.
    pub repeat_interval: i32,
    /// Comma-separated weekday numbers, 1 = Sunday through 7 = Saturday.
    pub weekly_days: String,
    /// Day of month, 1..=31. Takes precedence over the week fields.
    pub monthly_day: i32,
    /// Week of month, 1..=4, or -1 for the last week.
    pub monthly_week: i32,
    /// Weekday paired with `monthly_week`, 1 = Sunday through 7 = Saturday.
    pub monthly_week_day: i32,
    /// Cap on the number of occurrences returned. 0 = unbounded.
    pub end_times: i32,
    /// Exclusive upper bound on occurrence start times.
    pub end_date_time: Option<DateTime<Utc>>,
}

impl Recurrence {
    pub fn daily(repeat_interval: i32) -> Self {
        Self {
            recurrence_type: RecurrenceType::Daily.code(),
            repeat_interval,
            ..Self::default()
        }
    }

    pub fn weekly(repeat_interval: i32, weekly_days: &str) -> Self {
        Self {
            recurrence_type: RecurrenceType::Weekly.code(),
            repeat_interval,
            weekly_days: weekly_days.to_string(),
            ..Self::default()
        }
    }

    pub fn monthly_by_day(repeat_interval: i32, monthly_day: i32) -> Self {
        Self {
            recurrence_type: RecurrenceType::Monthly.code(),
            repeat_interval,
            monthly_day,
            ..Self::default()
        }
    }

    pub fn monthly_by_weekday(repeat_interval: i32, monthly_week: i32, monthly_week_day: i32) -> Self {
        Self {
            recurrence_type: RecurrenceType::Monthly.code(),
            repeat_interval,
            monthly_week,
            monthly_week_day,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_end_times(mut self, end_times: i32) -> Self {
        self.end_times = end_times;
        self
    }

    #[must_use]
    pub fn with_end_date_time(mut self, end: DateTime<Utc>) -> Self {
        self.end_date_time = Some(end);
        self
    }

    /// The pattern kind, or `None` for an unrecognized type code.
    pub fn kind(&self) -> Option<RecurrenceType> {
        RecurrenceType::from_code(self.recurrence_type)
    }

    /// A short English summary, e.g. "Every 2 weeks on Monday, Friday, 10 times".
    pub fn describe(&self) -> String {
        let interval = self.repeat_interval.max(1);
        let mut text = match self.kind() {
            None => return format!("Unknown recurrence type {}", self.recurrence_type),
            Some(RecurrenceType::Daily) => every(interval, "day", "Daily"),
            Some(RecurrenceType::Weekly) => {
                let base = every(interval, "week", "Weekly");
                let days = calendar::parse_weekly_days(&self.weekly_days);
                if days.is_empty() {
                    base
                } else {
                    let names: Vec<&str> = days.iter().map(|d| calendar::weekday_name(*d)).collect();
                    format!("{} on {}", base, names.join(", "))
                }
            }
            Some(RecurrenceType::Monthly) => {
                let base = every(interval, "month", "Monthly");
                if self.monthly_day > 0 {
                    format!("{} on day {}", base, self.monthly_day)
                } else if let Some(weekday) = calendar::weekday_from_rule(self.monthly_week_day) {
                    let name = calendar::weekday_name(weekday);
                    match self.monthly_week {
                        -1 => format!("{} on the last {}", base, name),
                        n @ 1..=5 => format!("{} on the {} {}", base, ordinal(n), name),
                        _ => base,
                    }
                } else {
                    base
                }
            }
        };

        if self.end_times > 0 {
            text.push_str(&format!(", {} times", self.end_times));
        }
        if let Some(end) = self.end_date_time {
            text.push_str(&format!(", until {}", end.to_rfc3339()));
        }
        text
    }
}

fn every(interval: i32, unit: &str, single: &str) -> String {
    if interval == 1 {
        single.to_string()
    } else {
        format!("Every {} {}s", interval, unit)
    }
}

fn ordinal(n: i32) -> &'static str {
    match n {
        1 => "first",
        2 => "second",
        3 => "third",
        4 => "fourth",
        _ => "fifth",
    }
}

/// The meeting snapshot the engine reads. Owned by the meeting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingBase {
    /// The anchor instant of the series.
    pub start_time: DateTime<Utc>,
    /// Length of each occurrence in minutes.
    pub duration: i32,
    /// IANA zone name. Unknown names fall back to UTC.
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    /// Previously computed occurrences; only their cancellation flags are read.
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub registrant_count: i32,
}

impl MeetingBase {
    pub fn new(start_time: DateTime<Utc>, duration: i32, timezone: &str) -> Self {
        Self {
            start_time,
            duration,
            timezone: timezone.to_string(),
            recurrence: None,
            occurrences: Vec::new(),
            title: String::new(),
            description: String::new(),
            registrant_count: 0,
        }
    }

    #[must_use]
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
}

/// One concrete instance of a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Unix epoch seconds of `start_time`, as a decimal string.
    pub occurrence_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub registrant_count: i32,
    #[serde(default)]
    pub response_count_yes: i32,
    #[serde(default)]
    pub response_count_no: i32,
    #[serde(default)]
    pub response_count_maybe: i32,
    #[serde(default)]
    pub is_cancelled: bool,
    /// Always `None` on generated occurrences.
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn recurrence_type_codes() {
        assert_eq!(RecurrenceType::from_code(1), Some(RecurrenceType::Daily));
        assert_eq!(RecurrenceType::from_code(2), Some(RecurrenceType::Weekly));
        assert_eq!(RecurrenceType::from_code(3), Some(RecurrenceType::Monthly));
        assert_eq!(RecurrenceType::from_code(0), None);
        assert_eq!(RecurrenceType::from_code(4), None);
        assert_eq!(RecurrenceType::Monthly.code(), 3);
    }

    #[test]
    fn recurrence_deserializes_with_type_key_and_defaults() {
        let rule: Recurrence =
            serde_json::from_str(r#"{"type":2,"repeat_interval":1,"weekly_days":"2,4"}"#).unwrap();
        assert_eq!(rule.kind(), Some(RecurrenceType::Weekly));
        assert_eq!(rule.weekly_days, "2,4");
        assert_eq!(rule.monthly_day, 0);
        assert_eq!(rule.end_date_time, None);
    }

    #[test]
    fn meeting_deserializes_minimal_snapshot() {
        let meeting: MeetingBase =
            serde_json::from_str(r#"{"start_time":"2024-06-03T09:00:00Z","duration":30}"#).unwrap();
        assert_eq!(
            meeting.start_time,
            Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
        );
        assert!(meeting.recurrence.is_none());
        assert!(meeting.occurrences.is_empty());
        assert_eq!(meeting.timezone, "");
    }

    #[test]
    fn describe_patterns() {
        assert_eq!(Recurrence::daily(1).describe(), "Daily");
        assert_eq!(Recurrence::daily(3).describe(), "Every 3 days");
        assert_eq!(
            Recurrence::weekly(2, "2,6").describe(),
            "Every 2 weeks on Monday, Friday"
        );
        assert_eq!(
            Recurrence::monthly_by_day(1, 31).with_end_times(5).describe(),
            "Monthly on day 31, 5 times"
        );
        assert_eq!(
            Recurrence::monthly_by_weekday(1, 2, 3).describe(),
            "Monthly on the second Tuesday"
        );
        assert_eq!(
            Recurrence::monthly_by_weekday(1, -1, 6).describe(),
            "Monthly on the last Friday"
        );
        assert_eq!(
            Recurrence {
                recurrence_type: 9,
                ..Recurrence::default()
            }
            .describe(),
            "Unknown recurrence type 9"
        );
    }
}
