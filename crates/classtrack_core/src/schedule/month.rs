//! Monday-first month grid with per-day schedule summaries.

use crate::model::course::Course;
use crate::model::event::CalendarEvent;
use crate::model::school_override::OverrideKind;
use crate::model::time::weekday_index;
use crate::schedule::agenda::compose_agenda;
use crate::schedule::resolver::OverrideTable;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// One calendar day in a month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthDay {
    pub date: NaiveDate,
    /// Schedule weekday after overrides; `None` on no-school days.
    pub weekday: Option<Weekday>,
    pub override_kind: Option<OverrideKind>,
    pub class_count: usize,
    pub event_count: usize,
}

/// Days of one month laid out on a Monday-first week grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st (the 1st's Monday-first weekday index).
    pub leading_blanks: u32,
    pub days: Vec<MonthDay>,
}

/// Builds the grid for `year`/`month`; `None` for an invalid month.
pub fn month_grid(
    year: i32,
    month: u32,
    courses: &[Course],
    events: &[CalendarEvent],
    overrides: &OverrideTable,
) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = first
        .iter_days()
        .take_while(|date| date.month() == month)
        .map(|date| {
            let weekday = overrides.resolve_weekday(date);
            let agenda = compose_agenda(weekday, courses, events, date);
            MonthDay {
                date,
                weekday,
                override_kind: overrides.get(date).map(|record| record.kind.clone()),
                class_count: agenda.class_count(),
                event_count: agenda.event_count(),
            }
        })
        .collect();

    Some(MonthGrid {
        year,
        month,
        leading_blanks: weekday_index(first),
        days,
    })
}
