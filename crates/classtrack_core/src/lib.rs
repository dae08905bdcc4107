//! Core domain logic for ClassTrack, a single-user assignment, class schedule
//! and calendar tracker.
//! This crate is the single source of truth for planner invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::assignment::{Assignment, AssignmentDraft, AssignmentStatus};
pub use model::course::{Course, CourseDraft};
pub use model::event::{CalendarEvent, EventDraft};
pub use model::school_override::{OverrideKind, SchoolOverride};
pub use model::time::{
    minutes_to_time, parse_calendar_date, time_to_minutes, to_iso_date, weekday_index, TimeOfDay,
};
pub use model::validation::RecordValidationError;
pub use model::RecordId;
pub use repo::kv_store::{KvStore, SqliteKvStore};
pub use repo::{RepoError, RepoResult};
pub use schedule::agenda::{compose_agenda, Agenda, AgendaItem, AgendaKind, TimedItem};
pub use schedule::resolver::OverrideTable;
pub use schedule::timeline::{height_of, pixel_to_time, position_of, TimelineBlock};
pub use service::assignment_query::{AssignmentQuery, DueState, StatusFilter};
pub use service::planner_service::{PlannerError, PlannerResult, PlannerService};

/// Version of the planner core, reported by launchers.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn core_version_is_semver_like() {
        assert_eq!(core_version().split('.').count(), 3);
    }
}
