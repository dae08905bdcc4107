//! Date-specific school schedule overrides.
//!
//! # Invariants
//! - At most one override exists per date; see
//!   [`crate::schedule::resolver::OverrideTable`].

use crate::model::RecordId;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an override does to the date's class schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideKind {
    /// No classes meet on this date.
    NoSchool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Classes follow another weekday's schedule.
    DaySchedule {
        #[serde(default)]
        weekday: Option<Weekday>,
    },
}

/// Persisted override record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolOverride {
    pub id: RecordId,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: OverrideKind,
}

impl SchoolOverride {
    pub fn new(date: NaiveDate, kind: OverrideKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
        }
    }

    /// No-school override with an optional display label.
    pub fn no_school(date: NaiveDate, label: Option<String>) -> Self {
        let label = label
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self::new(date, OverrideKind::NoSchool { label })
    }

    /// Override that substitutes `weekday`'s schedule.
    pub fn day_schedule(date: NaiveDate, weekday: Weekday) -> Self {
        Self::new(
            date,
            OverrideKind::DaySchedule {
                weekday: Some(weekday),
            },
        )
    }

    pub fn is_no_school(&self) -> bool {
        matches!(self.kind, OverrideKind::NoSchool { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tag_is_flattened_into_record() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 28).unwrap();
        let record = SchoolOverride::no_school(date, Some("Thanksgiving".to_string()));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], "no_school");
        assert_eq!(value["date"], "2024-11-28");
        assert_eq!(value["label"], "Thanksgiving");

        let parsed: SchoolOverride = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn day_schedule_reads_weekday_label() {
        let json = r#"{
            "id": "3e2b3f7e-0a44-4d0d-8a53-4f6b5a0b2f19",
            "date": "2024-03-06",
            "kind": "day_schedule",
            "weekday": "Fri"
        }"#;
        let parsed: SchoolOverride = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.kind,
            OverrideKind::DaySchedule {
                weekday: Some(Weekday::Fri)
            }
        );
    }

    #[test]
    fn blank_label_is_dropped() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let record = SchoolOverride::no_school(date, Some("   ".to_string()));
        assert_eq!(record.kind, OverrideKind::NoSchool { label: None });
    }
}
