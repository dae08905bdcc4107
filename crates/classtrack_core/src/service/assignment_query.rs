//! Assignment filtering, ordering and due-state classification.

use crate::model::assignment::{Assignment, AssignmentStatus};
use crate::model::course::course_name_key;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Window before the due moment in which an open assignment is "due soon".
pub const DUE_SOON_WINDOW_HOURS: i64 = 24;

/// Urgency of an assignment relative to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueState {
    Done,
    Overdue,
    DueSoon,
    Upcoming,
}

/// Classifies `assignment` at local time `now`.
pub fn due_state(assignment: &Assignment, now: NaiveDateTime) -> DueState {
    if assignment.is_done() {
        return DueState::Done;
    }
    let due_at = assignment.due_at();
    if now > due_at {
        DueState::Overdue
    } else if due_at - now <= Duration::hours(DUE_SOON_WINDOW_HOURS) {
        DueState::DueSoon
    } else {
        DueState::Upcoming
    }
}

/// Status filter for assignment lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Done,
}

/// List filter; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentQuery {
    pub status: StatusFilter,
    /// Exact course name, compared case-insensitively.
    pub course_name: Option<String>,
    /// Case-insensitive substring over title, course name and notes.
    pub text: Option<String>,
}

impl AssignmentQuery {
    pub fn matches(&self, assignment: &Assignment) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Open => assignment.status == AssignmentStatus::Open,
            StatusFilter::Done => assignment.status == AssignmentStatus::Done,
        };
        if !status_ok {
            return false;
        }

        if let Some(course_name) = non_blank(self.course_name.as_deref()) {
            if course_name_key(course_name) != course_name_key(&assignment.course_name) {
                return false;
            }
        }

        if let Some(text) = non_blank(self.text.as_deref()) {
            let needle = text.trim().to_lowercase();
            let haystacks = [
                assignment.title.as_str(),
                assignment.course_name.as_str(),
                assignment.notes.as_str(),
            ];
            if !haystacks
                .iter()
                .any(|value| value.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        true
    }
}

/// Filters and orders assignments by due moment, then title.
pub fn query_assignments<'a>(
    assignments: &'a [Assignment],
    query: &AssignmentQuery,
) -> Vec<&'a Assignment> {
    let mut matched = assignments
        .iter()
        .filter(|assignment| query.matches(assignment))
        .collect::<Vec<_>>();
    matched.sort_by(|a, b| {
        a.due_at()
            .cmp(&b.due_at())
            .then_with(|| a.title.cmp(&b.title))
    });
    matched
}

/// Number of assignments naming `course_name` (case-insensitive).
pub fn course_reference_count(assignments: &[Assignment], course_name: &str) -> usize {
    let key = course_name_key(course_name);
    assignments
        .iter()
        .filter(|assignment| course_name_key(&assignment.course_name) == key)
        .count()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
