//! "Next class" lookup across upcoming days.

use crate::model::course::Course;
use crate::model::time::TimeOfDay;
use crate::model::RecordId;
use crate::schedule::resolver::OverrideTable;
use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// Days scanned past today before giving up.
pub const NEXT_CLASS_HORIZON_DAYS: u64 = 14;

/// Upcoming class meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextClass {
    pub course_id: RecordId,
    pub name: String,
    pub date: NaiveDate,
    pub start: TimeOfDay,
}

/// Earliest class meeting starting at or after `now`.
///
/// Only courses with a start time are candidates. Overrides apply to every
/// scanned day.
pub fn next_class(
    now: NaiveDateTime,
    courses: &[Course],
    overrides: &OverrideTable,
) -> Option<NextClass> {
    let today = now.date();
    let now_minutes = now.hour() * 60 + now.minute();

    (0..=NEXT_CLASS_HORIZON_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .find_map(|date| {
            let weekday = overrides.resolve_weekday(date)?;
            courses
                .iter()
                .filter(|course| course.meets_on(weekday))
                .filter_map(|course| course.start_time.map(|start| (course, start)))
                .filter(|(_, start)| date != today || start.minutes() >= now_minutes)
                .min_by(|(a, a_start), (b, b_start)| {
                    a_start.cmp(b_start).then_with(|| a.name.cmp(&b.name))
                })
                .map(|(course, start)| NextClass {
                    course_id: course.id,
                    name: course.name.clone(),
                    date,
                    start,
                })
        })
}
