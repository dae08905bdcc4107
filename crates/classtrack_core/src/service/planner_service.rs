//! Planner application-state owner.
//!
//! # Responsibility
//! - Hold the four planner collections in memory.
//! - Expose add/update/delete transitions per collection, each validating,
//!   mutating and persisting in one call.
//! - Answer schedule queries through the shared override resolver.
//!
//! # Invariants
//! - A rejected transition leaves memory and storage untouched.
//! - Every collection a transition touches is written in one storage batch
//!   before any in-memory copy changes, so a storage failure also leaves
//!   memory untouched.
//! - Course names are unique case-insensitively.
//! - A course named by any assignment cannot be deleted; events are never
//!   guarded.

use crate::model::assignment::{Assignment, AssignmentDraft, AssignmentStatus};
use crate::model::course::{course_name_key, Course, CourseDraft};
use crate::model::event::{CalendarEvent, EventDraft};
use crate::model::school_override::SchoolOverride;
use crate::model::validation::RecordValidationError;
use crate::model::RecordId;
use crate::repo::collection::{encode_collection, load_collection, save_collection};
use crate::repo::kv_store::KvStore;
use crate::repo::RepoError;
use crate::schedule::agenda::{compose_agenda, events_on, Agenda};
use crate::schedule::month::{month_grid, MonthGrid};
use crate::schedule::next_class::{next_class, NextClass};
use crate::schedule::resolver::OverrideTable;
use crate::schedule::timeline::{layout_day, TimelineBlock};
use crate::service::assignment_query::{
    course_reference_count, due_state, query_assignments, AssignmentQuery, DueState,
};
use crate::service::course_merge::{merge_courses, sort_courses};
use chrono::{NaiveDate, NaiveDateTime, Utc, Weekday};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Reasons a planner transition was refused or failed.
#[derive(Debug)]
pub enum PlannerError {
    /// Required form field missing or invalid.
    Validation(RecordValidationError),
    /// Another course already uses this name (case-insensitive).
    DuplicateCourseName(String),
    /// Course is still named by assignments.
    CourseInUse { course_id: RecordId, references: usize },
    AssignmentNotFound(RecordId),
    CourseNotFound(RecordId),
    EventNotFound(RecordId),
    /// Storage failure.
    Repo(RepoError),
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateCourseName(name) => write!(f, "course name already exists: `{name}`"),
            Self::CourseInUse {
                course_id,
                references,
            } => write!(
                f,
                "course {course_id} is referenced by {references} assignment(s)"
            ),
            Self::AssignmentNotFound(id) => write!(f, "assignment not found: {id}"),
            Self::CourseNotFound(id) => write!(f, "course not found: {id}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for PlannerError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for PlannerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Single owner of planner state backed by a key-value store.
pub struct PlannerService<S: KvStore> {
    store: S,
    assignments: Vec<Assignment>,
    courses: Vec<Course>,
    events: Vec<CalendarEvent>,
    overrides: OverrideTable,
}

impl<S: KvStore> PlannerService<S> {
    /// Loads every collection from `store`.
    ///
    /// Malformed stored records are dropped. Course placeholders synthesized
    /// from assignment names are written back so their ids stay stable.
    ///
    /// # Errors
    /// - Only storage transport failures.
    pub fn load(store: S) -> PlannerResult<Self> {
        let assignments = load_collection::<Assignment>(&store)?;
        let stored_courses = load_collection::<Course>(&store)?;
        let stored_count = stored_courses.len();
        let (courses, synthesized) = merge_courses(stored_courses, &assignments);
        if synthesized > 0 || courses.len() != stored_count {
            save_collection(&store, &courses)?;
        }

        let events = load_collection::<CalendarEvent>(&store)?;
        let overrides = OverrideTable::from_records(load_collection::<SchoolOverride>(&store)?);

        info!(
            "event=planner_load module=service status=ok assignments={} courses={} synthesized_courses={} events={} overrides={}",
            assignments.len(),
            courses.len(),
            synthesized,
            events.len(),
            overrides.len()
        );

        Ok(Self {
            store,
            assignments,
            courses,
            events,
            overrides,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Courses sorted by name.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn assignment(&self, id: RecordId) -> Option<&Assignment> {
        self.assignments.iter().find(|item| item.id == id)
    }

    pub fn course(&self, id: RecordId) -> Option<&Course> {
        self.courses.iter().find(|item| item.id == id)
    }

    pub fn event(&self, id: RecordId) -> Option<&CalendarEvent> {
        self.events.iter().find(|item| item.id == id)
    }

    // ---- assignments ----

    /// Creates an open assignment; an unknown course name also creates a
    /// placeholder course.
    pub fn add_assignment(&mut self, draft: &AssignmentDraft) -> PlannerResult<RecordId> {
        let assignment = Assignment::from_draft(draft)?;
        let id = assignment.id;

        let mut next = self.assignments.clone();
        next.push(assignment);
        self.commit_with_course_names(next)?;

        info!("event=assignment_add module=service status=ok id={id}");
        Ok(id)
    }

    pub fn update_assignment(&mut self, id: RecordId, draft: &AssignmentDraft) -> PlannerResult<()> {
        let mut next = self.assignments.clone();
        let target = next
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(PlannerError::AssignmentNotFound(id))?;
        target.apply_draft(draft)?;
        self.commit_with_course_names(next)
    }

    /// Moves an assignment to `status`, stamping or clearing `completed_at`.
    pub fn set_assignment_status(
        &mut self,
        id: RecordId,
        status: AssignmentStatus,
    ) -> PlannerResult<()> {
        let mut next = self.assignments.clone();
        let target = next
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(PlannerError::AssignmentNotFound(id))?;
        target.set_status(status, Utc::now());
        self.commit_assignments(next)
    }

    /// Flips Open <-> Done and returns the new status.
    pub fn toggle_assignment(&mut self, id: RecordId) -> PlannerResult<AssignmentStatus> {
        let current = self
            .assignment(id)
            .map(|item| item.status)
            .ok_or(PlannerError::AssignmentNotFound(id))?;
        let next_status = match current {
            AssignmentStatus::Open => AssignmentStatus::Done,
            AssignmentStatus::Done => AssignmentStatus::Open,
        };
        self.set_assignment_status(id, next_status)?;
        Ok(next_status)
    }

    pub fn delete_assignment(&mut self, id: RecordId) -> PlannerResult<()> {
        if self.assignment(id).is_none() {
            return Err(PlannerError::AssignmentNotFound(id));
        }
        let next = self
            .assignments
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.commit_assignments(next)
    }

    /// Filtered assignments ordered by due moment.
    pub fn query_assignments(&self, query: &AssignmentQuery) -> Vec<&Assignment> {
        query_assignments(&self.assignments, query)
    }

    /// Urgency of every assignment at `now`, in stored order.
    pub fn due_states(&self, now: NaiveDateTime) -> Vec<(RecordId, DueState)> {
        self.assignments
            .iter()
            .map(|item| (item.id, due_state(item, now)))
            .collect()
    }

    // ---- courses ----

    pub fn add_course(&mut self, draft: &CourseDraft) -> PlannerResult<RecordId> {
        let course = Course::from_draft(draft)?;
        self.ensure_unique_name(&course.name, None)?;
        let id = course.id;

        let mut next = self.courses.clone();
        next.push(course);
        self.commit_courses(next)?;

        info!("event=course_add module=service status=ok id={id}");
        Ok(id)
    }

    /// Edits a course. A rename also renames the course on every assignment
    /// that named the old name, so no placeholder reappears on next load.
    pub fn update_course(&mut self, id: RecordId, draft: &CourseDraft) -> PlannerResult<()> {
        let mut next = self.courses.clone();
        let target = next
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(PlannerError::CourseNotFound(id))?;
        let old_key = target.name_key();
        target.apply_draft(draft)?;
        let new_name = target.name.clone();
        self.ensure_unique_name(&new_name, Some(id))?;

        let mut commit = Commit {
            courses: Some(next),
            ..Commit::default()
        };
        if course_name_key(&new_name) != old_key {
            let mut assignments = self.assignments.clone();
            let mut touched = 0;
            for assignment in assignments
                .iter_mut()
                .filter(|item| course_name_key(&item.course_name) == old_key)
            {
                assignment.course_name = new_name.clone();
                touched += 1;
            }
            if touched > 0 {
                commit.assignments = Some(assignments);
            }
        }
        self.apply(commit)
    }

    /// Deletes a course unless an assignment still names it.
    pub fn delete_course(&mut self, id: RecordId) -> PlannerResult<()> {
        let course = self.course(id).ok_or(PlannerError::CourseNotFound(id))?;
        let references = course_reference_count(&self.assignments, &course.name);
        if references > 0 {
            warn!(
                "event=course_delete module=service status=refused id={id} references={references}"
            );
            return Err(PlannerError::CourseInUse {
                course_id: id,
                references,
            });
        }

        let next = self
            .courses
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.commit_courses(next)
    }

    // ---- events ----

    pub fn add_event(&mut self, draft: &EventDraft) -> PlannerResult<RecordId> {
        let event = CalendarEvent::from_draft(draft)?;
        let id = event.id;
        let mut next = self.events.clone();
        next.push(event);
        self.commit_events(next)?;
        Ok(id)
    }

    pub fn update_event(&mut self, id: RecordId, draft: &EventDraft) -> PlannerResult<()> {
        let mut next = self.events.clone();
        let target = next
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(PlannerError::EventNotFound(id))?;
        target.apply_draft(draft)?;
        self.commit_events(next)
    }

    /// Deletes an event. Events carry no referential guard.
    pub fn delete_event(&mut self, id: RecordId) -> PlannerResult<()> {
        if self.event(id).is_none() {
            return Err(PlannerError::EventNotFound(id));
        }
        let next = self
            .events
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.commit_events(next)
    }

    // ---- overrides ----

    /// Stores an override, replacing any existing one on the same date.
    /// Returns the replaced override.
    pub fn set_override(&mut self, record: SchoolOverride) -> PlannerResult<Option<SchoolOverride>> {
        let mut next = self.overrides.clone();
        let replaced = next.insert(record);
        self.commit_overrides(next)?;
        Ok(replaced)
    }

    pub fn set_no_school(
        &mut self,
        date: NaiveDate,
        label: Option<String>,
    ) -> PlannerResult<Option<SchoolOverride>> {
        self.set_override(SchoolOverride::no_school(date, label))
    }

    pub fn set_day_schedule(
        &mut self,
        date: NaiveDate,
        weekday: Weekday,
    ) -> PlannerResult<Option<SchoolOverride>> {
        self.set_override(SchoolOverride::day_schedule(date, weekday))
    }

    /// Removes the override on `date`; `Ok(None)` when there was none.
    pub fn remove_override(&mut self, date: NaiveDate) -> PlannerResult<Option<SchoolOverride>> {
        if self.overrides.get(date).is_none() {
            return Ok(None);
        }
        let mut next = self.overrides.clone();
        let removed = next.remove(date);
        self.commit_overrides(next)?;
        Ok(removed)
    }

    // ---- schedule queries ----

    /// Weekday schedule in effect on `date`; `None` for no school.
    pub fn resolve_weekday(&self, date: NaiveDate) -> Option<Weekday> {
        self.overrides.resolve_weekday(date)
    }

    pub fn agenda_for(&self, date: NaiveDate) -> Agenda {
        compose_agenda(self.resolve_weekday(date), &self.courses, &self.events, date)
    }

    pub fn timeline_for(&self, date: NaiveDate) -> Vec<TimelineBlock> {
        layout_day(&self.agenda_for(date))
    }

    /// Events on `date`, timed first in time order.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        events_on(date, &self.events)
    }

    pub fn month_grid(&self, year: i32, month: u32) -> Option<MonthGrid> {
        month_grid(year, month, &self.courses, &self.events, &self.overrides)
    }

    pub fn next_class(&self, now: NaiveDateTime) -> Option<NextClass> {
        next_class(now, &self.courses, &self.overrides)
    }

    // ---- internals ----

    fn ensure_unique_name(&self, name: &str, except: Option<RecordId>) -> PlannerResult<()> {
        let key = course_name_key(name);
        let taken = self
            .courses
            .iter()
            .any(|course| Some(course.id) != except && course.name_key() == key);
        if taken {
            return Err(PlannerError::DuplicateCourseName(name.trim().to_string()));
        }
        Ok(())
    }

    /// Commits `assignments` together with placeholder courses for any
    /// course name they introduce.
    fn commit_with_course_names(&mut self, assignments: Vec<Assignment>) -> PlannerResult<()> {
        let (merged, synthesized) = merge_courses(self.courses.clone(), &assignments);
        self.apply(Commit {
            assignments: Some(assignments),
            courses: (synthesized > 0).then_some(merged),
            ..Commit::default()
        })?;
        if synthesized > 0 {
            info!("event=course_merge module=service status=ok synthesized={synthesized}");
        }
        Ok(())
    }

    fn commit_assignments(&mut self, next: Vec<Assignment>) -> PlannerResult<()> {
        self.apply(Commit {
            assignments: Some(next),
            ..Commit::default()
        })
    }

    fn commit_courses(&mut self, next: Vec<Course>) -> PlannerResult<()> {
        self.apply(Commit {
            courses: Some(next),
            ..Commit::default()
        })
    }

    fn commit_events(&mut self, next: Vec<CalendarEvent>) -> PlannerResult<()> {
        self.apply(Commit {
            events: Some(next),
            ..Commit::default()
        })
    }

    fn commit_overrides(&mut self, next: OverrideTable) -> PlannerResult<()> {
        self.apply(Commit {
            overrides: Some(next),
            ..Commit::default()
        })
    }

    /// Writes every collection in `commit` as one storage batch, then swaps
    /// them into memory.
    fn apply(&mut self, commit: Commit) -> PlannerResult<()> {
        let Commit {
            assignments,
            mut courses,
            events,
            overrides,
        } = commit;
        if let Some(courses) = courses.as_mut() {
            sort_courses(courses);
        }

        let mut entries = Vec::new();
        if let Some(records) = &assignments {
            entries.push(encode_collection(records)?);
        }
        if let Some(records) = &courses {
            entries.push(encode_collection(records)?);
        }
        if let Some(records) = &events {
            entries.push(encode_collection(records)?);
        }
        if let Some(table) = &overrides {
            entries.push(encode_collection(&table.to_sorted_vec())?);
        }

        if let Err(err) = self.store.set_items(&entries) {
            let keys = entries
                .iter()
                .map(|(key, _)| *key)
                .collect::<Vec<_>>()
                .join(",");
            warn!("event=collection_save module=service status=error keys={keys} error={err}");
            return Err(err.into());
        }

        if let Some(records) = assignments {
            self.assignments = records;
        }
        if let Some(records) = courses {
            self.courses = records;
        }
        if let Some(records) = events {
            self.events = records;
        }
        if let Some(table) = overrides {
            self.overrides = table;
        }
        Ok(())
    }
}

/// Collections replaced by one transition; `None` keeps the current one.
#[derive(Default)]
struct Commit {
    assignments: Option<Vec<Assignment>>,
    courses: Option<Vec<Course>>,
    events: Option<Vec<CalendarEvent>>,
    overrides: Option<OverrideTable>,
}
