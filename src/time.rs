// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Time windows and booking slots.
//!
//! All instants are shop-local wall time ([`NaiveDateTime`]). Windows are
//! half-open: `[start, end)`.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start <= end).then_some(TimeRange { start, end })
    }

    /// Every instant the store can represent.
    pub fn everything() -> Self {
        let start = NaiveDate::from_ymd_opt(1, 1, 1)
            .map(|d| d.and_time(midnight()))
            .unwrap_or(NaiveDateTime::MIN);
        let end = NaiveDate::from_ymd_opt(9999, 12, 31)
            .map(|d| d.and_time(midnight()))
            .unwrap_or(NaiveDateTime::MAX);
        TimeRange { start, end }
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }

    pub fn day_of(day: NaiveDate) -> Self {
        let start = day.and_time(midnight());
        TimeRange {
            start,
            end: start + Duration::days(1),
        }
    }

    /// Week containing `day`, starting on Sunday.
    pub fn week_of(day: NaiveDate) -> Self {
        let back = day.weekday().num_days_from_sunday() as i64;
        let first = day - Duration::days(back);
        let start = first.and_time(midnight());
        TimeRange {
            start,
            end: start + Duration::days(7),
        }
    }

    pub fn month_of(day: NaiveDate) -> Self {
        let first = day.with_day(1).unwrap_or(day);
        let next = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        };
        let start = first.and_time(midnight());
        let end = next
            .map(|d| d.and_time(midnight()))
            .unwrap_or(NaiveDateTime::MAX);
        TimeRange { start, end }
    }
}

/// Interval a booking occupies on its professional's chair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    /// A missing duration yields a zero-width slot at `start`.
    pub fn from_start(start: NaiveDateTime, duration_minutes: Option<u32>) -> Self {
        let minutes = duration_minutes.unwrap_or(0) as i64;
        Slot {
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    /// Two slots conflict when they begin together or their half-open
    /// intervals intersect. A zero-width slot conflicts with any slot that
    /// starts at or strictly contains its instant.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.start == other.start || (self.start < other.end && other.start < self.end)
    }
}

fn midnight() -> NaiveTime {
    NaiveTime::default()
}

pub fn hour_label(t: NaiveDateTime) -> String {
    format!("{:02}:00", t.hour())
}

pub fn format_instant(t: NaiveDateTime) -> String {
    t.format(STORAGE_FORMAT).to_string()
}

pub fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), STORAGE_FORMAT).ok()
}

/// Source of "now" for operations that stamp records.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_instant(s).unwrap()
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-03-12 is a Wednesday
        let w = TimeRange::week_of(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        assert_eq!(w.start, at("2025-03-09 00:00:00"));
        assert_eq!(w.end, at("2025-03-16 00:00:00"));

        let sunday = TimeRange::week_of(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(sunday, w);
    }

    #[test]
    fn month_rolls_over_december() {
        let m = TimeRange::month_of(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(m.start, at("2024-12-01 00:00:00"));
        assert_eq!(m.end, at("2025-01-01 00:00:00"));
    }

    #[test]
    fn range_is_half_open() {
        let d = TimeRange::day_of(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert!(d.contains(at("2025-01-02 00:00:00")));
        assert!(d.contains(at("2025-01-02 23:59:59")));
        assert!(!d.contains(at("2025-01-03 00:00:00")));
        assert!(TimeRange::new(d.end, d.start).is_none());
    }

    #[test]
    fn slot_overlap_rules() {
        let a = Slot::from_start(at("2025-01-02 09:00:00"), Some(30));
        let adjacent = Slot::from_start(at("2025-01-02 09:30:00"), Some(30));
        let inside = Slot::from_start(at("2025-01-02 09:10:00"), Some(5));
        assert!(!a.overlaps(&adjacent));
        assert!(!adjacent.overlaps(&a));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));

        let point = Slot::from_start(at("2025-01-02 09:00:00"), None);
        assert!(point.overlaps(&a));
        assert!(point.overlaps(&point));
        let later_point = Slot::from_start(at("2025-01-02 09:30:00"), None);
        assert!(!later_point.overlaps(&a));
    }

    #[test]
    fn hour_labels_are_two_digits() {
        assert_eq!(hour_label(at("2025-01-02 09:50:00")), "09:00");
        assert_eq!(hour_label(at("2025-01-02 00:05:00")), "00:00");
        assert_eq!(hour_label(at("2025-01-02 23:00:00")), "23:00");
    }
}
