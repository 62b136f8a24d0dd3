//! Pattern generators -- lazy sequences of candidate occurrence start instants.
//!
//! Each generator works in the meeting's timezone and keeps the anchor's
//! local time-of-day. A generator stops when its cursor reaches the rule's
//! exclusive `end_date_time`, or when it has taken its safety-cap number of
//! steps. In the second case [`Candidates::truncated`] reports `true` so a
//! caller can tell a capped series from an exhausted one.
//!
//! Generators are `Clone`; cloning before iterating restarts the sequence.

use std::collections::VecDeque;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::calendar::{
    add_months, clamped_day_of_month, last_weekday_of_month, nth_weekday_of_month,
    parse_weekly_days, week_start, weekday_from_rule,
};
use crate::config::EngineConfig;
use crate::model::{Recurrence, RecurrenceType};
use crate::tz::resolve_local;

/// Candidate start instants for one recurrence rule.
#[derive(Debug, Clone)]
pub enum Candidates {
    Daily(DailyCandidates),
    Weekly(WeeklyCandidates),
    Monthly(MonthlyCandidates),
}

impl Candidates {
    /// Build the generator for `kind`, anchored at `anchor` in `tz`.
    pub fn new(
        kind: RecurrenceType,
        rule: &Recurrence,
        anchor: DateTime<Utc>,
        tz: Tz,
        config: &EngineConfig,
    ) -> Self {
        let interval = repeat_interval(rule.repeat_interval);
        let end = rule.end_date_time;
        match kind {
            RecurrenceType::Daily => Candidates::Daily(DailyCandidates::new(
                anchor,
                tz,
                interval,
                end,
                config.daily_cap_days,
            )),
            RecurrenceType::Weekly => Candidates::Weekly(WeeklyCandidates::new(
                anchor,
                tz,
                &rule.weekly_days,
                interval,
                end,
                config.weekly_cap_weeks,
            )),
            RecurrenceType::Monthly => {
                let anchor_day = anchor.with_timezone(&tz).day();
                Candidates::Monthly(MonthlyCandidates::new(
                    anchor,
                    tz,
                    MonthlyMode::from_rule(rule, anchor_day),
                    interval,
                    end,
                    config.monthly_cap_months,
                ))
            }
        }
    }

    /// Move a daily cursor forward to within one interval of `earliest`
    /// without counting the skipped steps against the safety cap. Every
    /// skipped candidate starts strictly before `earliest`. Weekly and
    /// monthly caps count from the anchor, so those generators ignore this.
    pub fn skip_to(&mut self, earliest: DateTime<Utc>) {
        if let Candidates::Daily(g) = self {
            g.skip_to(earliest);
        }
    }

    /// `true` once the generator has stopped because of its safety cap.
    pub fn truncated(&self) -> bool {
        match self {
            Candidates::Daily(g) => g.truncated,
            Candidates::Weekly(g) => g.truncated,
            Candidates::Monthly(g) => g.truncated,
        }
    }
}

impl Iterator for Candidates {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Candidates::Daily(g) => g.next(),
            Candidates::Weekly(g) => g.next(),
            Candidates::Monthly(g) => g.next(),
        }
    }
}

/// Non-positive intervals would never advance the cursor; treat them as 1.
fn repeat_interval(raw: i32) -> u32 {
    if raw < 1 {
        warn!(repeat_interval = raw, "non-positive repeat interval, using 1");
        1
    } else {
        raw.unsigned_abs()
    }
}

/// The anchor's wall-clock time in the meeting's timezone.
#[derive(Debug, Clone, Copy)]
struct WallClock {
    tz: Tz,
    anchor: DateTime<Utc>,
    local: NaiveDateTime,
}

impl WallClock {
    fn new(anchor: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            tz,
            anchor,
            local: anchor.with_timezone(&tz).naive_local(),
        }
    }

    fn date(&self) -> NaiveDate {
        self.local.date()
    }

    /// The anchor's time-of-day on `date`.
    ///
    /// On the anchor's own date this is the anchor itself, which matters when
    /// the anchor sits in the second half of a DST overlap.
    fn on(&self, date: NaiveDate) -> DateTime<Utc> {
        if date == self.local.date() {
            return self.anchor;
        }
        resolve_local(&self.tz, date.and_time(self.local.time())).with_timezone(&Utc)
    }

    fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        resolve_local(&self.tz, date.and_time(NaiveTime::MIN)).with_timezone(&Utc)
    }
}

fn past_end(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
    end.is_some_and(|end| start >= end)
}

// ---------------------------------------------------------------------------
// Daily
// ---------------------------------------------------------------------------

/// Every `interval` days from the anchor.
#[derive(Debug, Clone)]
pub struct DailyCandidates {
    clock: WallClock,
    date: NaiveDate,
    interval: u64,
    end: Option<DateTime<Utc>>,
    steps: u32,
    cap: u32,
    truncated: bool,
    done: bool,
}

impl DailyCandidates {
    fn new(anchor: DateTime<Utc>, tz: Tz, interval: u32, end: Option<DateTime<Utc>>, cap: u32) -> Self {
        let clock = WallClock::new(anchor, tz);
        Self {
            clock,
            date: clock.date(),
            interval: u64::from(interval),
            end,
            steps: 0,
            cap,
            truncated: false,
            done: false,
        }
    }

    fn skip_to(&mut self, earliest: DateTime<Utc>) {
        let target = earliest.with_timezone(&self.clock.tz).date_naive();
        let behind = (target - self.date).num_days();
        let Ok(behind) = u64::try_from(behind) else {
            return;
        };
        // Stop one full interval short so DST shifts cannot skip a candidate
        // that is still relevant.
        let jumps = (behind / self.interval).saturating_sub(1);
        if jumps == 0 {
            return;
        }
        if let Some(date) = self.date.checked_add_days(Days::new(jumps * self.interval)) {
            debug!(from = %self.date, to = %date, "daily cursor skipped ahead");
            self.date = date;
        }
    }
}

impl Iterator for DailyCandidates {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = self.clock.on(self.date);
        if past_end(start, self.end) {
            self.done = true;
            return None;
        }
        if self.steps >= self.cap {
            debug!(cap = self.cap, "daily generation hit safety cap");
            self.truncated = true;
            self.done = true;
            return None;
        }
        self.steps += 1;
        match self.date.checked_add_days(Days::new(self.interval)) {
            Some(next) => self.date = next,
            None => self.done = true,
        }
        Some(start)
    }
}

// ---------------------------------------------------------------------------
// Weekly
// ---------------------------------------------------------------------------

/// Selected weekdays, in Sunday-first order, every `interval` weeks.
#[derive(Debug, Clone)]
pub struct WeeklyCandidates {
    clock: WallClock,
    weekdays: Vec<Weekday>,
    first: NaiveDate,
    week: NaiveDate,
    interval_days: u64,
    end: Option<DateTime<Utc>>,
    pending: VecDeque<DateTime<Utc>>,
    blocks: u32,
    cap: u32,
    truncated: bool,
    done: bool,
}

impl WeeklyCandidates {
    fn new(
        anchor: DateTime<Utc>,
        tz: Tz,
        weekly_days: &str,
        interval: u32,
        end: Option<DateTime<Utc>>,
        cap: u32,
    ) -> Self {
        let clock = WallClock::new(anchor, tz);
        let date = clock.date();
        let mut weekdays = parse_weekly_days(weekly_days);
        if weekdays.is_empty() {
            weekdays.push(date.weekday());
        }
        // First matching day on or after the anchor; always within a week.
        let first = date
            .iter_days()
            .take(7)
            .find(|d| weekdays.contains(&d.weekday()))
            .unwrap_or(date);

        Self {
            clock,
            weekdays,
            first,
            week: week_start(first),
            interval_days: 7 * u64::from(interval),
            end,
            pending: VecDeque::new(),
            blocks: 0,
            cap,
            truncated: false,
            done: false,
        }
    }

    /// Queue the current week's candidates and advance to the next block.
    fn fill_week(&mut self) {
        for weekday in &self.weekdays {
            let Some(date) = self
                .week
                .checked_add_days(Days::new(u64::from(weekday.num_days_from_sunday())))
            else {
                continue;
            };
            if date < self.first {
                continue;
            }
            let start = self.clock.on(date);
            // A later weekday may still fall before the end in a partial week,
            // so skip rather than stop.
            if past_end(start, self.end) {
                continue;
            }
            self.pending.push_back(start);
        }
        self.blocks += 1;
        match self.week.checked_add_days(Days::new(self.interval_days)) {
            Some(next) => self.week = next,
            None => self.done = true,
        }
    }
}

impl Iterator for WeeklyCandidates {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(start) = self.pending.pop_front() {
                return Some(start);
            }
            if self.done {
                return None;
            }
            let block_start = self.clock.midnight(self.week);
            if past_end(block_start, self.end) {
                self.done = true;
                return None;
            }
            if self.blocks >= self.cap {
                debug!(cap = self.cap, "weekly generation hit safety cap");
                self.truncated = true;
                self.done = true;
                return None;
            }
            self.fill_week();
        }
    }
}

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------

/// How a monthly rule picks its day within each month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyMode {
    /// Fixed day number, clamped to the month's length.
    DayOfMonth(u32),
    /// The `week`th `weekday` of the month.
    NthWeekday { week: u8, weekday: Weekday },
    /// The last `weekday` of the month.
    LastWeekday(Weekday),
}

impl MonthlyMode {
    /// Select the mode: day-of-month first, then the week/weekday pair,
    /// then the anchor's own day-of-month.
    pub fn from_rule(rule: &Recurrence, anchor_day: u32) -> Self {
        if rule.monthly_day > 0 {
            return MonthlyMode::DayOfMonth(rule.monthly_day.unsigned_abs());
        }
        if let Some(weekday) = weekday_from_rule(rule.monthly_week_day) {
            match rule.monthly_week {
                -1 => return MonthlyMode::LastWeekday(weekday),
                week @ 1..=5 => {
                    return MonthlyMode::NthWeekday {
                        week: week as u8,
                        weekday,
                    }
                }
                _ => {}
            }
        }
        MonthlyMode::DayOfMonth(anchor_day)
    }

    /// The matching date in the given month, if the month has one.
    pub fn date_in(self, year: i32, month: u32) -> Option<NaiveDate> {
        match self {
            MonthlyMode::DayOfMonth(day) => clamped_day_of_month(year, month, day),
            MonthlyMode::NthWeekday { week, weekday } => {
                nth_weekday_of_month(year, month, weekday, week)
            }
            MonthlyMode::LastWeekday(weekday) => last_weekday_of_month(year, month, weekday),
        }
    }
}

/// One date every `interval` months, starting in the anchor's month.
#[derive(Debug, Clone)]
pub struct MonthlyCandidates {
    clock: WallClock,
    mode: MonthlyMode,
    year: i32,
    month: u32,
    interval: i64,
    end: Option<DateTime<Utc>>,
    steps: u32,
    cap: u32,
    truncated: bool,
    done: bool,
}

impl MonthlyCandidates {
    fn new(
        anchor: DateTime<Utc>,
        tz: Tz,
        mode: MonthlyMode,
        interval: u32,
        end: Option<DateTime<Utc>>,
        cap: u32,
    ) -> Self {
        let clock = WallClock::new(anchor, tz);
        let date = clock.date();
        Self {
            clock,
            mode,
            year: date.year(),
            month: date.month(),
            interval: i64::from(interval),
            end,
            steps: 0,
            cap,
            truncated: false,
            done: false,
        }
    }
}

impl Iterator for MonthlyCandidates {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.steps >= self.cap {
                debug!(cap = self.cap, "monthly generation hit safety cap");
                self.truncated = true;
                self.done = true;
                return None;
            }
            let offset = i64::from(self.steps) * self.interval;
            self.steps += 1;

            let Some((year, month)) = add_months(self.year, self.month, offset) else {
                self.done = true;
                return None;
            };
            let Some(date) = self.mode.date_in(year, month) else {
                continue;
            };
            let start = self.clock.on(date);
            // The anchor month's target day may precede the anchor itself.
            if start < self.clock.anchor {
                continue;
            }
            if past_end(start, self.end) {
                self.done = true;
                return None;
            }
            return Some(start);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn generate(rule: &Recurrence, anchor: DateTime<Utc>, tz: Tz, n: usize) -> Vec<DateTime<Utc>> {
        let kind = rule.kind().unwrap();
        Candidates::new(kind, rule, anchor, tz, &EngineConfig::default())
            .take(n)
            .collect()
    }

    #[test]
    fn daily_steps_by_interval() {
        let got = generate(&Recurrence::daily(3), utc(2024, 1, 30, 8, 15), Tz::UTC, 3);
        assert_eq!(
            got,
            vec![
                utc(2024, 1, 30, 8, 15),
                utc(2024, 2, 2, 8, 15),
                utc(2024, 2, 5, 8, 15)
            ]
        );
    }

    #[test]
    fn daily_keeps_wall_clock_across_dst() {
        // 09:00 in New York: EST (UTC-5) before 2024-03-10, EDT (UTC-4) after.
        let got = generate(
            &Recurrence::daily(1),
            utc(2024, 3, 9, 14, 0),
            Tz::America__New_York,
            2,
        );
        assert_eq!(got, vec![utc(2024, 3, 9, 14, 0), utc(2024, 3, 10, 13, 0)]);
    }

    #[test]
    fn daily_stops_before_end() {
        let rule = Recurrence::daily(1).with_end_date_time(utc(2024, 1, 3, 8, 0));
        let got = generate(&rule, utc(2024, 1, 1, 8, 0), Tz::UTC, 10);
        assert_eq!(got, vec![utc(2024, 1, 1, 8, 0), utc(2024, 1, 2, 8, 0)]);
    }

    #[test]
    fn non_positive_interval_is_treated_as_one() {
        let got = generate(&Recurrence::daily(0), utc(2024, 1, 1, 8, 0), Tz::UTC, 2);
        assert_eq!(got, vec![utc(2024, 1, 1, 8, 0), utc(2024, 1, 2, 8, 0)]);
        let got = generate(&Recurrence::monthly_by_day(-2, 5), utc(2024, 1, 5, 8, 0), Tz::UTC, 2);
        assert_eq!(got, vec![utc(2024, 1, 5, 8, 0), utc(2024, 2, 5, 8, 0)]);
    }

    #[test]
    fn weekly_defaults_to_anchor_weekday() {
        // 2024-06-05 is a Wednesday.
        let got = generate(&Recurrence::weekly(1, ""), utc(2024, 6, 5, 9, 0), Tz::UTC, 3);
        assert_eq!(
            got,
            vec![
                utc(2024, 6, 5, 9, 0),
                utc(2024, 6, 12, 9, 0),
                utc(2024, 6, 19, 9, 0)
            ]
        );
    }

    #[test]
    fn weekly_skips_days_before_anchor_in_first_week() {
        // Anchor Wednesday 2024-06-05; Monday 06-03 precedes it.
        let got = generate(&Recurrence::weekly(1, "2,4"), utc(2024, 6, 5, 9, 0), Tz::UTC, 3);
        assert_eq!(
            got,
            vec![
                utc(2024, 6, 5, 9, 0),
                utc(2024, 6, 10, 9, 0),
                utc(2024, 6, 12, 9, 0)
            ]
        );
    }

    #[test]
    fn weekly_searches_forward_to_first_match() {
        // Anchor Tuesday 2024-06-04, rule only Friday.
        let got = generate(&Recurrence::weekly(2, "6"), utc(2024, 6, 4, 9, 0), Tz::UTC, 2);
        assert_eq!(got, vec![utc(2024, 6, 7, 9, 0), utc(2024, 6, 21, 9, 0)]);
    }

    #[test]
    fn weekly_end_mid_week_skips_remaining_days() {
        // End on Wednesday 06-12 at 09:00: Wednesday itself is excluded.
        let rule = Recurrence::weekly(1, "2,4,6").with_end_date_time(utc(2024, 6, 12, 9, 0));
        let got = generate(&rule, utc(2024, 6, 3, 9, 0), Tz::UTC, 20);
        assert_eq!(
            got,
            vec![
                utc(2024, 6, 3, 9, 0),
                utc(2024, 6, 5, 9, 0),
                utc(2024, 6, 7, 9, 0),
                utc(2024, 6, 10, 9, 0)
            ]
        );
    }

    #[test]
    fn weekly_safety_cap_truncates() {
        let config = EngineConfig {
            weekly_cap_weeks: 2,
            ..EngineConfig::default()
        };
        let rule = Recurrence::weekly(1, "2");
        let mut candidates = Candidates::new(
            RecurrenceType::Weekly,
            &rule,
            utc(2024, 6, 3, 9, 0),
            Tz::UTC,
            &config,
        );
        let got: Vec<_> = candidates.by_ref().collect();
        assert_eq!(got.len(), 2);
        assert!(candidates.truncated());
    }

    #[test]
    fn end_date_is_not_truncation() {
        let rule = Recurrence::daily(1).with_end_date_time(utc(2024, 1, 5, 0, 0));
        let mut candidates = Candidates::new(
            RecurrenceType::Daily,
            &rule,
            utc(2024, 1, 1, 8, 0),
            Tz::UTC,
            &EngineConfig::default(),
        );
        assert_eq!(candidates.by_ref().count(), 4);
        assert!(!candidates.truncated());
    }

    #[test]
    fn daily_skip_to_does_not_count_against_cap() {
        let config = EngineConfig {
            daily_cap_days: 3,
            ..EngineConfig::default()
        };
        let mut candidates = Candidates::new(
            RecurrenceType::Daily,
            &Recurrence::daily(2),
            utc(2000, 1, 1, 9, 0),
            Tz::UTC,
            &config,
        );
        candidates.skip_to(utc(2024, 6, 1, 0, 0));
        let got: Vec<_> = candidates.by_ref().collect();
        // 2000-01-01 + 2 * 4_459 days = 2024-06-01; the cursor stops one
        // interval earlier.
        assert_eq!(
            got,
            vec![
                utc(2024, 5, 30, 9, 0),
                utc(2024, 6, 1, 9, 0),
                utc(2024, 6, 3, 9, 0)
            ]
        );
        assert!(candidates.truncated());
    }

    #[test]
    fn daily_skip_to_before_cursor_is_noop() {
        let mut candidates = Candidates::new(
            RecurrenceType::Daily,
            &Recurrence::daily(1),
            utc(2024, 6, 1, 9, 0),
            Tz::UTC,
            &EngineConfig::default(),
        );
        candidates.skip_to(utc(2024, 5, 1, 0, 0));
        assert_eq!(candidates.next(), Some(utc(2024, 6, 1, 9, 0)));
    }

    #[test]
    fn clone_restarts_sequence() {
        let rule = Recurrence::monthly_by_day(1, 31);
        let candidates = Candidates::new(
            RecurrenceType::Monthly,
            &rule,
            utc(2024, 1, 31, 10, 0),
            Tz::UTC,
            &EngineConfig::default(),
        );
        let first: Vec<_> = candidates.clone().take(3).collect();
        let second: Vec<_> = candidates.take(3).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn monthly_mode_priority() {
        let mut rule = Recurrence::monthly_by_weekday(1, 2, 3);
        assert_eq!(
            MonthlyMode::from_rule(&rule, 11),
            MonthlyMode::NthWeekday {
                week: 2,
                weekday: Weekday::Tue
            }
        );
        rule.monthly_day = 20;
        assert_eq!(MonthlyMode::from_rule(&rule, 11), MonthlyMode::DayOfMonth(20));

        let last = Recurrence::monthly_by_weekday(1, -1, 6);
        assert_eq!(
            MonthlyMode::from_rule(&last, 28),
            MonthlyMode::LastWeekday(Weekday::Fri)
        );

        let bare = Recurrence::monthly_by_day(1, 0);
        assert_eq!(MonthlyMode::from_rule(&bare, 17), MonthlyMode::DayOfMonth(17));

        // A week without a valid weekday falls back to the anchor's day.
        let half = Recurrence::monthly_by_weekday(1, 2, 0);
        assert_eq!(MonthlyMode::from_rule(&half, 9), MonthlyMode::DayOfMonth(9));
    }

    #[test]
    fn monthly_skips_target_before_anchor() {
        // Day 10 is before the 2024-06-15 anchor, so June is skipped.
        let got = generate(&Recurrence::monthly_by_day(1, 10), utc(2024, 6, 15, 9, 0), Tz::UTC, 2);
        assert_eq!(got, vec![utc(2024, 7, 10, 9, 0), utc(2024, 8, 10, 9, 0)]);
    }

    #[test]
    fn monthly_fifth_weekday_skips_short_months() {
        // Fifth Friday: May 2024 has one (31st), June does not, August does (30th).
        let rule = Recurrence::monthly_by_weekday(1, 5, 6);
        let got = generate(&rule, utc(2024, 5, 31, 9, 0), Tz::UTC, 2);
        assert_eq!(got, vec![utc(2024, 5, 31, 9, 0), utc(2024, 8, 30, 9, 0)]);
    }

    #[test]
    fn monthly_uses_local_calendar() {
        // 2024-01-31 20:00 in Los Angeles is 2024-02-01 04:00 UTC; the
        // day-of-month comes from the local date.
        let got = generate(
            &Recurrence::monthly_by_day(1, 0),
            utc(2024, 2, 1, 4, 0),
            Tz::America__Los_Angeles,
            2,
        );
        assert_eq!(got, vec![utc(2024, 2, 1, 4, 0), utc(2024, 3, 1, 4, 0)]);
    }
}
