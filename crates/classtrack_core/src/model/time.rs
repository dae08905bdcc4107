//! Calendar date and time-of-day helpers.
//!
//! # Responsibility
//! - Convert between ISO date strings and timezone-free calendar dates.
//! - Convert between `HH:MM` strings and minute-of-day integers.
//! - Derive Monday-first weekday indexes.
//!
//! # Invariants
//! - Dates are never routed through UTC parsing, so `YYYY-MM-DD` always maps
//!   to the same calendar day regardless of host timezone.
//! - `minutes_to_time` output is always within `00:00..=23:59`.

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid iso date regex"));
static CLOCK_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid clock time regex"));

/// Number of minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;
/// Largest valid minute-of-day value (`23:59`).
pub const LAST_MINUTE_OF_DAY: u32 = MINUTES_PER_DAY - 1;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Parses `YYYY-MM-DD` into a calendar date.
///
/// Returns `None` for malformed input or impossible dates such as
/// `2025-02-30`.
pub fn parse_calendar_date(iso: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE_RE.captures(iso.trim())?;
    let year = caps[1].parse::<i32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    let day = caps[3].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Formats a calendar date as zero-padded `YYYY-MM-DD`.
pub fn to_iso_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Converts `HH:MM` to minutes since midnight.
///
/// Returns `None` for empty or unparseable input, and for values outside
/// `00:00..=23:59`.
pub fn time_to_minutes(value: &str) -> Option<u32> {
    let caps = CLOCK_TIME_RE.captures(value.trim())?;
    let hours = caps[1].parse::<u32>().ok()?;
    let minutes = caps[2].parse::<u32>().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight as `HH:MM`.
///
/// Input is clamped to `[0, 1439]` first; timeline click math can produce
/// values on either side of the day.
pub fn minutes_to_time(minutes: i64) -> String {
    let clamped = minutes.clamp(0, i64::from(LAST_MINUTE_OF_DAY));
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

/// Returns the Monday-first weekday index (`Mon = 0`, `Sun = 6`).
pub fn weekday_index(date: NaiveDate) -> u32 {
    // Sunday-first numbering remapped so Sunday lands at the end of the week.
    match date.weekday().num_days_from_sunday() {
        0 => 6,
        day => day - 1,
    }
}

/// Inverse of [`weekday_index`]; `None` for indexes above 6.
pub fn weekday_from_index(index: u32) -> Option<Weekday> {
    WEEKDAYS.get(index as usize).copied()
}

/// Natural (calendar) weekday of a date.
pub fn natural_weekday(date: NaiveDate) -> Weekday {
    WEEKDAYS[weekday_index(date) as usize]
}

/// Short label used in storage and display (`Mon`..`Sun`).
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Sorts and deduplicates a weekday set in Monday-first order.
pub fn normalize_weekdays(days: &[Weekday]) -> Vec<Weekday> {
    WEEKDAYS
        .iter()
        .copied()
        .filter(|day| days.contains(day))
        .collect()
}

/// Validated minute-of-day value, stored as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Builds a time from minutes since midnight; `None` past `23:59`.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes <= LAST_MINUTE_OF_DAY).then_some(Self(minutes))
    }

    /// Builds a time from hour/minute components.
    pub fn from_hm(hours: u32, minutes: u32) -> Option<Self> {
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some(Self(hours * 60 + minutes))
    }

    /// Parses `HH:MM`; see [`time_to_minutes`].
    pub fn parse(value: &str) -> Option<Self> {
        time_to_minutes(value).map(Self)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&minutes_to_time(i64::from(self.0)))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day `{raw}`")))
    }
}

/// Serde adapter for optional times where `null`, a missing field and `""`
/// all mean "no time".
pub mod optional_time {
    use super::TimeOfDay;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<TimeOfDay>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&time.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimeOfDay>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => TimeOfDay::parse(value).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid time of day `{value}`"))
            }),
        }
    }
}
