//! Assignment domain model.
//!
//! # Responsibility
//! - Define the persisted assignment record and its form draft.
//! - Own the Open/Done lifecycle transition.
//!
//! # Invariants
//! - `completed_at` is `Some` iff `status == AssignmentStatus::Done`.
//! - `course_name` is free text; it is matched against course names
//!   case-insensitively, never by id.

use crate::model::time::TimeOfDay;
use crate::model::validation::{require, require_text, RecordValidationError};
use crate::model::RecordId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completion state of an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    #[serde(alias = "Open")]
    Open,
    #[serde(alias = "Done")]
    Done,
}

/// Persisted assignment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub course_name: String,
    pub due_date: NaiveDate,
    pub due_time: TimeOfDay,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Form input for creating or editing an assignment.
///
/// Required fields are optional here so an incomplete form can be
/// represented; [`AssignmentDraft::validate`] rejects it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub title: String,
    pub course_name: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<TimeOfDay>,
    pub notes: String,
}

impl AssignmentDraft {
    /// Checks that every required field is present.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("title", &self.title)?;
        require_text("courseName", &self.course_name)?;
        require("dueDate", self.due_date)?;
        require("dueTime", self.due_time)?;
        Ok(())
    }
}

impl Assignment {
    /// Creates an open assignment from a validated draft.
    pub fn from_draft(draft: &AssignmentDraft) -> Result<Self, RecordValidationError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            course_name: draft.course_name.trim().to_string(),
            due_date: require("dueDate", draft.due_date)?,
            due_time: require("dueTime", draft.due_time)?,
            status: AssignmentStatus::Open,
            notes: draft.notes.clone(),
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    /// Replaces editable fields from a draft, keeping identity and lifecycle.
    pub fn apply_draft(&mut self, draft: &AssignmentDraft) -> Result<(), RecordValidationError> {
        draft.validate()?;
        self.title = draft.title.trim().to_string();
        self.course_name = draft.course_name.trim().to_string();
        self.due_date = require("dueDate", draft.due_date)?;
        self.due_time = require("dueTime", draft.due_time)?;
        self.notes = draft.notes.clone();
        Ok(())
    }

    /// Validates a persisted record.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("title", &self.title)
    }

    /// Moves the assignment to `status`, maintaining `completed_at`.
    ///
    /// Re-applying `Done` keeps the original completion timestamp.
    pub fn set_status(&mut self, status: AssignmentStatus, at: DateTime<Utc>) {
        match status {
            AssignmentStatus::Done => {
                if self.status != AssignmentStatus::Done || self.completed_at.is_none() {
                    self.completed_at = Some(at);
                }
            }
            AssignmentStatus::Open => self.completed_at = None,
        }
        self.status = status;
    }

    /// Repairs records whose completion timestamp disagrees with status.
    ///
    /// Done records without a timestamp fall back to `created_at`.
    pub fn normalize_completion(&mut self) {
        match self.status {
            AssignmentStatus::Open => self.completed_at = None,
            AssignmentStatus::Done => {
                if self.completed_at.is_none() {
                    self.completed_at = Some(self.created_at);
                }
            }
        }
    }

    /// Local due moment (due date at due time).
    pub fn due_at(&self) -> NaiveDateTime {
        let minutes = self.due_time.minutes();
        self.due_date
            .and_hms_opt(minutes / 60, minutes % 60, 0)
            .unwrap_or_else(|| self.due_date.and_time(chrono::NaiveTime::MIN))
    }

    pub fn is_done(&self) -> bool {
        self.status == AssignmentStatus::Done
    }
}
