//! Day timeline geometry.
//!
//! One minute maps to one layout unit, so a day spans 1440 units. Callers
//! scale units to pixels; `pixel_to_time` takes the rendered hour height to
//! invert a click position.

use crate::model::time::{minutes_to_time, LAST_MINUTE_OF_DAY};
use crate::schedule::agenda::{Agenda, AgendaItem, TimedItem};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// Minimum rendered height so short items stay visible and clickable.
pub const MIN_ITEM_HEIGHT: u32 = 30;
/// Click-to-time rounding step.
pub const SNAP_MINUTES: i64 = 5;

/// Positioned block on the day timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBlock {
    pub item: AgendaItem,
    pub top: u32,
    pub height: u32,
    pub start: u32,
    pub end: u32,
}

/// Vertical offset of an item.
pub fn position_of(item: &TimedItem) -> u32 {
    item.start
}

/// Rendered height of an item, never below [`MIN_ITEM_HEIGHT`].
pub fn height_of(item: &TimedItem) -> u32 {
    item.end.saturating_sub(item.start).max(MIN_ITEM_HEIGHT)
}

/// Maps a click offset to `HH:MM`, snapped to 5 minutes.
///
/// `row_height_per_hour` is the rendered height of one hour. Non-positive or
/// non-finite geometry maps to `00:00`.
pub fn pixel_to_time(y: f64, row_height_per_hour: f64) -> String {
    let raw_minutes = y / row_height_per_hour * 60.0;
    if !raw_minutes.is_finite() || row_height_per_hour <= 0.0 {
        return minutes_to_time(0);
    }
    let steps = (raw_minutes / SNAP_MINUTES as f64).round();
    // f64 -> i64 saturates, and minutes_to_time clamps the rest.
    let snapped = (steps as i64).saturating_mul(SNAP_MINUTES);
    minutes_to_time(snapped)
}

/// Offset of the current-time marker when `displayed` is today.
pub fn now_marker(displayed: NaiveDate, now: NaiveDateTime) -> Option<u32> {
    if now.date() != displayed {
        return None;
    }
    Some((now.hour() * 60 + now.minute()).min(LAST_MINUTE_OF_DAY))
}

/// Positions every timed item, ordered by start minute.
pub fn layout_day(agenda: &Agenda) -> Vec<TimelineBlock> {
    agenda
        .sorted_timed()
        .into_iter()
        .map(|timed| TimelineBlock {
            item: timed.item.clone(),
            top: position_of(timed),
            height: height_of(timed),
            start: timed.start,
            end: timed.end,
        })
        .collect()
}
