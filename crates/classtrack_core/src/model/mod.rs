//! Planner domain model.
//!
//! # Responsibility
//! - Define the four persisted record shapes: assignments, courses, events
//!   and school overrides.
//! - Provide pure date/time helpers shared by schedule computations.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Collections reference each other loosely; nothing cascades on delete.

pub mod assignment;
pub mod course;
pub mod event;
pub mod school_override;
pub mod time;
pub mod validation;

/// Stable identifier for every persisted planner record.
pub type RecordId = uuid::Uuid;
