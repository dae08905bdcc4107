//! Record-level validation errors shared by all planner collections.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure for planner records and drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// A required text field is empty after trim.
    BlankField(&'static str),
    /// A required non-text field was not provided.
    MissingField(&'static str),
    /// End time is earlier than start time.
    InvalidTimeRange { start: String, end: String },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "field `{field}` must not be blank"),
            Self::MissingField(field) => write!(f, "field `{field}` is required"),
            Self::InvalidTimeRange { start, end } => {
                write!(f, "end time {end} is earlier than start time {start}")
            }
        }
    }
}

impl Error for RecordValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require<T>(field: &'static str, value: Option<T>) -> Result<T, RecordValidationError> {
    value.ok_or(RecordValidationError::MissingField(field))
}
