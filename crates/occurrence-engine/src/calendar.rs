//! Calendar arithmetic helpers.
//!
//! Recurrence rules number weekdays 1..=7 starting from Sunday. That scheme
//! is translated to [`chrono::Weekday`] here and nowhere else.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Map a rule weekday number (1 = Sunday ... 7 = Saturday) to a [`Weekday`].
pub fn weekday_from_rule(day: i32) -> Option<Weekday> {
    match day {
        1 => Some(Weekday::Sun),
        2 => Some(Weekday::Mon),
        3 => Some(Weekday::Tue),
        4 => Some(Weekday::Wed),
        5 => Some(Weekday::Thu),
        6 => Some(Weekday::Fri),
        7 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Inverse of [`weekday_from_rule`].
pub fn weekday_to_rule(weekday: Weekday) -> i32 {
    weekday.num_days_from_sunday() as i32 + 1
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Parse a comma-separated weekday list such as `"2,4,6"`.
///
/// Entries that are blank, non-numeric, or outside 1..=7 are ignored.
/// The result is deduplicated and ordered Sunday first.
pub fn parse_weekly_days(raw: &str) -> Vec<Weekday> {
    let mut days: Vec<Weekday> = raw
        .split(',')
        .filter_map(|part| part.trim().parse::<i32>().ok())
        .filter_map(weekday_from_rule)
        .collect();
    days.sort_by_key(|d| d.num_days_from_sunday());
    days.dedup();
    days
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Last valid day number of the given month, or `None` for an invalid month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?
    };
    first_of_next.pred_opt().map(|d| d.day())
}

/// The date for `day` in the given month, clamped to the month's last day.
///
/// Day 31 in February yields February 28 or 29.
pub fn clamped_day_of_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

/// Shift a (year, month) pair by `offset` months.
pub fn add_months(year: i32, month: u32, offset: i64) -> Option<(i32, u32)> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + offset;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// The `n`th `weekday` of the month (n starts at 1).
///
/// Returns `None` when the month has fewer than `n` such weekdays.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

/// The last `weekday` of the month.
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let last = NaiveDate::from_ymd_opt(year, month, last_day_of_month(year, month)?)?;
    let back = (7 + last.weekday().num_days_from_sunday() - weekday.num_days_from_sunday()) % 7;
    Some(last - Duration::days(i64::from(back)))
}
