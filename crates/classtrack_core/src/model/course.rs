//! Course (class) domain model.
//!
//! # Invariants
//! - `name` is unique across courses, compared case-insensitively.
//! - `days` is kept sorted Monday-first without duplicates.
//! - `end_time` is not earlier than `start_time` when both are set.

use crate::model::time::{normalize_weekdays, optional_time, TimeOfDay};
use crate::model::validation::{require_text, RecordValidationError};
use crate::model::RecordId;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A class with an optional weekly meeting schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub days: Vec<Weekday>,
    #[serde(default, with = "optional_time")]
    pub start_time: Option<TimeOfDay>,
    #[serde(default, with = "optional_time")]
    pub end_time: Option<TimeOfDay>,
}

/// Form input for creating or editing a course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub name: String,
    pub days: Vec<Weekday>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
}

impl CourseDraft {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("name", &self.name)?;
        validate_time_range(self.start_time, self.end_time)
    }
}

impl Course {
    /// Creates a course from a validated draft.
    pub fn from_draft(draft: &CourseDraft) -> Result<Self, RecordValidationError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            days: normalize_weekdays(&draft.days),
            start_time: draft.start_time,
            end_time: draft.end_time,
        })
    }

    /// Course synthesized from an assignment's free-text course name.
    pub fn placeholder(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            days: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn apply_draft(&mut self, draft: &CourseDraft) -> Result<(), RecordValidationError> {
        draft.validate()?;
        self.name = draft.name.trim().to_string();
        self.days = normalize_weekdays(&draft.days);
        self.start_time = draft.start_time;
        self.end_time = draft.end_time;
        Ok(())
    }

    /// Restores the day and time-range invariants on a stored record.
    ///
    /// An end before the start is pulled up to the start.
    pub fn normalize_schedule(&mut self) {
        self.days = normalize_weekdays(&self.days);
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                self.end_time = Some(start);
            }
        }
    }

    /// Whether the weekly schedule includes `weekday`.
    pub fn meets_on(&self, weekday: Weekday) -> bool {
        self.days.contains(&weekday)
    }

    /// Case-insensitive comparison key for `name`.
    pub fn name_key(&self) -> String {
        course_name_key(&self.name)
    }
}

/// Normalized key used for every course-name comparison.
pub fn course_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_time_range(
    start: Option<TimeOfDay>,
    end: Option<TimeOfDay>,
) -> Result<(), RecordValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(RecordValidationError::InvalidTimeRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_normalizes_days_and_trims_name() {
        let course = Course::from_draft(&CourseDraft {
            name: "  Biology ".to_string(),
            days: vec![Weekday::Wed, Weekday::Mon, Weekday::Wed],
            start_time: TimeOfDay::from_hm(9, 0),
            end_time: None,
        })
        .unwrap();
        assert_eq!(course.name, "Biology");
        assert_eq!(course.days, vec![Weekday::Mon, Weekday::Wed]);
        assert!(course.meets_on(Weekday::Wed));
        assert!(!course.meets_on(Weekday::Tue));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = CourseDraft {
            name: "Math".to_string(),
            days: vec![Weekday::Tue],
            start_time: TimeOfDay::from_hm(10, 0),
            end_time: TimeOfDay::from_hm(9, 0),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, RecordValidationError::InvalidTimeRange { .. }));
    }

    #[test]
    fn normalize_schedule_sorts_days_and_lifts_end() {
        let mut course = Course {
            days: vec![Weekday::Fri, Weekday::Mon, Weekday::Fri],
            start_time: TimeOfDay::from_hm(13, 0),
            end_time: TimeOfDay::from_hm(12, 30),
            ..Course::placeholder("Drama")
        };
        course.normalize_schedule();
        assert_eq!(course.days, vec![Weekday::Mon, Weekday::Fri]);
        assert_eq!(course.end_time, TimeOfDay::from_hm(13, 0));
    }

    #[test]
    fn empty_time_strings_deserialize_as_none() {
        let json = r#"{
            "id": "0d3c7d0e-9f77-4b8e-8f3a-0b8c8c5a1c21",
            "name": "Art",
            "days": ["Mon", "Thu"],
            "startTime": "",
            "endTime": null
        }"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.days, vec![Weekday::Mon, Weekday::Thu]);
        assert!(course.start_time.is_none());
        assert!(course.end_time.is_none());
    }
}
