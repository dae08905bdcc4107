//! Calendar event domain model.
//!
//! Events are one-off entries on a single date. An event without a time is
//! an all-day event.

use crate::model::time::{optional_time, TimeOfDay};
use crate::model::validation::{require, require_text, RecordValidationError};
use crate::model::RecordId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: RecordId,
    pub title: String,
    #[serde(default, with = "optional_id", skip_serializing_if = "Option::is_none")]
    pub course_id: Option<RecordId>,
    pub date: NaiveDate,
    #[serde(default, with = "optional_time")]
    pub time: Option<TimeOfDay>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Form input for creating or editing an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub course_id: Option<RecordId>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeOfDay>,
    pub notes: String,
}

impl EventDraft {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("title", &self.title)?;
        require("date", self.date)?;
        Ok(())
    }
}

impl CalendarEvent {
    pub fn from_draft(draft: &EventDraft) -> Result<Self, RecordValidationError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            course_id: draft.course_id,
            date: require("date", draft.date)?,
            time: draft.time,
            notes: draft.notes.clone(),
            created_at: Utc::now(),
        })
    }

    pub fn apply_draft(&mut self, draft: &EventDraft) -> Result<(), RecordValidationError> {
        draft.validate()?;
        self.title = draft.title.trim().to_string();
        self.course_id = draft.course_id;
        self.date = require("date", draft.date)?;
        self.time = draft.time;
        self.notes = draft.notes.clone();
        Ok(())
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("title", &self.title)
    }

    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }
}

/// Treats `""` and `null` course links as "no course".
mod optional_id {
    use crate::model::RecordId;
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(
        value: &Option<RecordId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<RecordId>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Uuid::parse_str(value)
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid course id `{value}`"))),
        }
    }
}
