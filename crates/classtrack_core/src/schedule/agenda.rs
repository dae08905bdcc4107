//! Per-date agenda composition.
//!
//! # Responsibility
//! - Merge recurring class meetings and one-off events for a single date.
//! - Split the result into timed items and all-day items.
//!
//! # Invariants
//! - No class item is produced when the resolved weekday is `None`.
//! - Events match on exact date equality; they never recur.
//! - Every timed item has `end >= start`.

use crate::model::course::Course;
use crate::model::event::CalendarEvent;
use crate::model::time::MINUTES_PER_DAY;
use crate::model::RecordId;
use chrono::{NaiveDate, Weekday};
use serde::Serialize;

/// Layout duration for timed events and for classes without an end time.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Sort key for untimed events; greater than every valid minute-of-day.
const UNTIMED_SORT_KEY: u32 = MINUTES_PER_DAY;

/// Origin of an agenda entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaKind {
    Class,
    Event,
}

/// Display data shared by timed and all-day entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaItem {
    pub kind: AgendaKind,
    /// Id of the course or event that produced this entry.
    pub source_id: RecordId,
    pub title: String,
    /// Event notes; empty for class meetings.
    pub notes: String,
    /// Linked course (the course itself for class meetings).
    pub course_id: Option<RecordId>,
}

/// Entry with a definite position on the day timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimedItem {
    pub item: AgendaItem,
    /// Minutes since midnight.
    pub start: u32,
    /// Minutes since midnight; may exceed the last minute of the day when a
    /// default duration runs past midnight.
    pub end: u32,
}

/// Merged entries for one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Agenda {
    pub timed: Vec<TimedItem>,
    pub all_day: Vec<AgendaItem>,
}

impl Agenda {
    /// Timed items ordered by start minute, then title.
    pub fn sorted_timed(&self) -> Vec<&TimedItem> {
        let mut items = self.timed.iter().collect::<Vec<_>>();
        items.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.item.title.cmp(&b.item.title))
        });
        items
    }

    pub fn class_count(&self) -> usize {
        self.count_kind(AgendaKind::Class)
    }

    pub fn event_count(&self) -> usize {
        self.count_kind(AgendaKind::Event)
    }

    pub fn is_empty(&self) -> bool {
        self.timed.is_empty() && self.all_day.is_empty()
    }

    fn count_kind(&self, kind: AgendaKind) -> usize {
        self.timed.iter().filter(|entry| entry.item.kind == kind).count()
            + self.all_day.iter().filter(|item| item.kind == kind).count()
    }
}

/// Builds the agenda for `date`.
///
/// `weekday` must come from the override resolver; `None` means no school and
/// suppresses every class meeting.
pub fn compose_agenda(
    weekday: Option<Weekday>,
    courses: &[Course],
    events: &[CalendarEvent],
    date: NaiveDate,
) -> Agenda {
    let mut agenda = Agenda::default();

    if let Some(weekday) = weekday {
        for course in courses.iter().filter(|course| course.meets_on(weekday)) {
            let item = AgendaItem {
                kind: AgendaKind::Class,
                source_id: course.id,
                title: course.name.clone(),
                notes: String::new(),
                course_id: Some(course.id),
            };
            match course.start_time {
                Some(start) => {
                    let start = start.minutes();
                    let end = course
                        .end_time
                        .map(|end| end.minutes().max(start))
                        .unwrap_or(start + DEFAULT_DURATION_MINUTES);
                    agenda.timed.push(TimedItem { item, start, end });
                }
                // A course with an end time but no start has no anchor on
                // the timeline either.
                None => agenda.all_day.push(item),
            }
        }
    }

    for event in events_on(date, events) {
        let item = AgendaItem {
            kind: AgendaKind::Event,
            source_id: event.id,
            title: event.title.clone(),
            notes: event.notes.clone(),
            course_id: event.course_id,
        };
        match event.time {
            Some(time) => {
                let start = time.minutes();
                agenda.timed.push(TimedItem {
                    item,
                    start,
                    end: start + DEFAULT_DURATION_MINUTES,
                });
            }
            None => agenda.all_day.push(item),
        }
    }

    agenda
}

/// Events on `date`, ordered by time with untimed events last.
///
/// The sort is stable, so events sharing a time keep stored order.
pub fn events_on(date: NaiveDate, events: &[CalendarEvent]) -> Vec<&CalendarEvent> {
    let mut day_events = events
        .iter()
        .filter(|event| event.date == date)
        .collect::<Vec<_>>();
    day_events.sort_by_key(|event| event_sort_key(event));
    day_events
}

fn event_sort_key(event: &CalendarEvent) -> u32 {
    event
        .time
        .map_or(UNTIMED_SORT_KEY, |time| time.minutes())
}
