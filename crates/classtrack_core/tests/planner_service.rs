use classtrack_core::db::open_db_in_memory;
use classtrack_core::{
    AgendaKind, AssignmentDraft, AssignmentQuery, AssignmentStatus, CourseDraft, DueState,
    EventDraft, KvStore, OverrideKind, PlannerError, PlannerService, RecordValidationError,
    RepoError, RepoResult, SqliteKvStore, StatusFilter, TimeOfDay,
};
use chrono::{NaiveDate, Weekday};
use rusqlite::Connection;

fn planner(conn: &Connection) -> PlannerService<SqliteKvStore<'_>> {
    PlannerService::load(SqliteKvStore::try_new(conn).unwrap()).unwrap()
}

/// Store that refuses writes to one key, to exercise partial failures.
struct FailingKeyStore<'conn> {
    inner: SqliteKvStore<'conn>,
    failing_key: &'static str,
}

impl KvStore for FailingKeyStore<'_> {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        if key == self.failing_key {
            return Err(RepoError::InvalidData(format!("write to {key} refused")));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> RepoResult<()> {
        self.inner.remove_item(key)
    }

    fn keys(&self) -> RepoResult<Vec<String>> {
        self.inner.keys()
    }
}

fn failing_planner<'conn>(
    conn: &'conn Connection,
    failing_key: &'static str,
) -> PlannerService<FailingKeyStore<'conn>> {
    let store = FailingKeyStore {
        inner: SqliteKvStore::try_new(conn).unwrap(),
        failing_key,
    };
    PlannerService::load(store).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn course_draft(name: &str, days: &[Weekday]) -> CourseDraft {
    CourseDraft {
        name: name.to_string(),
        days: days.to_vec(),
        start_time: TimeOfDay::from_hm(10, 0),
        end_time: TimeOfDay::from_hm(11, 15),
    }
}

fn assignment_draft(title: &str, course_name: &str) -> AssignmentDraft {
    AssignmentDraft {
        title: title.to_string(),
        course_name: course_name.to_string(),
        due_date: Some(date(2024, 5, 10)),
        due_time: TimeOfDay::from_hm(23, 59),
        notes: String::new(),
    }
}

#[test]
fn deleting_unreferenced_course_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    let id = planner
        .add_course(&course_draft("Geometry", &[Weekday::Mon]))
        .unwrap();

    planner.delete_course(id).unwrap();
    assert!(planner.courses().is_empty());

    let reloaded = self::planner(&conn);
    assert!(reloaded.courses().is_empty());
}

#[test]
fn deleting_referenced_course_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    let id = planner
        .add_course(&course_draft("Geometry", &[Weekday::Mon]))
        .unwrap();
    planner
        .add_assignment(&assignment_draft("Proofs", "geometry"))
        .unwrap();
    let before = planner.courses().to_vec();

    let err = planner.delete_course(id).unwrap_err();
    assert!(matches!(
        err,
        PlannerError::CourseInUse { course_id, references: 1 } if course_id == id
    ));
    assert_eq!(planner.courses(), before.as_slice());
}

#[test]
fn duplicate_course_names_are_rejected_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    planner
        .add_course(&course_draft("Spanish", &[Weekday::Tue]))
        .unwrap();
    let other = planner
        .add_course(&course_draft("French", &[Weekday::Thu]))
        .unwrap();

    let err = planner
        .add_course(&course_draft(" spanish ", &[Weekday::Fri]))
        .unwrap_err();
    assert!(matches!(err, PlannerError::DuplicateCourseName(_)));

    let err = planner
        .update_course(other, &course_draft("SPANISH", &[Weekday::Thu]))
        .unwrap_err();
    assert!(matches!(err, PlannerError::DuplicateCourseName(_)));
    assert_eq!(planner.course(other).unwrap().name, "French");
    assert_eq!(planner.courses().len(), 2);
}

#[test]
fn renaming_course_follows_assignment_references() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    let id = planner
        .add_course(&course_draft("Bio", &[Weekday::Wed]))
        .unwrap();
    let assignment_id = planner
        .add_assignment(&assignment_draft("Cells", "bio"))
        .unwrap();

    planner
        .update_course(id, &course_draft("Biology", &[Weekday::Wed]))
        .unwrap();

    assert_eq!(
        planner.assignment(assignment_id).unwrap().course_name,
        "Biology"
    );
    let reloaded = self::planner(&conn);
    assert_eq!(reloaded.courses().len(), 1);
    assert_eq!(reloaded.courses()[0].name, "Biology");
}

#[test]
fn invalid_drafts_leave_state_untouched() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);

    let mut missing_time = assignment_draft("Essay", "English");
    missing_time.due_time = None;
    let err = planner.add_assignment(&missing_time).unwrap_err();
    assert!(matches!(
        err,
        PlannerError::Validation(RecordValidationError::MissingField("dueTime"))
    ));

    let err = planner
        .add_event(&EventDraft {
            title: "  ".to_string(),
            date: Some(date(2024, 5, 1)),
            ..EventDraft::default()
        })
        .unwrap_err();
    assert!(matches!(err, PlannerError::Validation(_)));

    assert!(planner.assignments().is_empty());
    assert!(planner.events().is_empty());
    assert!(planner.courses().is_empty());
    assert_eq!(planner.store().get_item("assignments").unwrap(), None);
}

#[test]
fn adding_assignment_synthesizes_course() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    planner
        .add_assignment(&assignment_draft("Reading", "Literature"))
        .unwrap();

    assert_eq!(planner.courses().len(), 1);
    assert_eq!(planner.courses()[0].name, "Literature");
    assert!(planner.courses()[0].days.is_empty());
}

#[test]
fn status_transitions_persist_completion() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    let id = planner
        .add_assignment(&assignment_draft("Quiz prep", "Chem"))
        .unwrap();

    assert_eq!(planner.toggle_assignment(id).unwrap(), AssignmentStatus::Done);
    let reloaded = self::planner(&conn);
    let stored = reloaded.assignment(id).unwrap();
    assert_eq!(stored.status, AssignmentStatus::Done);
    assert!(stored.completed_at.is_some());

    planner
        .set_assignment_status(id, AssignmentStatus::Open)
        .unwrap();
    assert!(planner.assignment(id).unwrap().completed_at.is_none());

    let open = planner.query_assignments(&AssignmentQuery {
        status: StatusFilter::Open,
        ..AssignmentQuery::default()
    });
    assert_eq!(open.len(), 1);

    let before_due = date(2024, 5, 10).and_hms_opt(8, 0, 0).unwrap();
    assert_eq!(planner.due_states(before_due), vec![(id, DueState::DueSoon)]);
}

#[test]
fn missing_records_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    let ghost = uuid::Uuid::new_v4();

    assert!(matches!(
        planner.delete_assignment(ghost),
        Err(PlannerError::AssignmentNotFound(_))
    ));
    assert!(matches!(
        planner.delete_course(ghost),
        Err(PlannerError::CourseNotFound(_))
    ));
    assert!(matches!(
        planner.delete_event(ghost),
        Err(PlannerError::EventNotFound(_))
    ));
}

#[test]
fn events_are_deleted_without_guard() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    let course_id = planner
        .add_course(&course_draft("Band", &[Weekday::Fri]))
        .unwrap();
    let event_id = planner
        .add_event(&EventDraft {
            title: "Concert".to_string(),
            course_id: Some(course_id),
            date: Some(date(2024, 5, 3)),
            time: TimeOfDay::from_hm(18, 30),
            notes: "Bring uniform".to_string(),
        })
        .unwrap();

    let agenda = planner.agenda_for(date(2024, 5, 3));
    assert_eq!(agenda.class_count(), 1);
    assert_eq!(agenda.event_count(), 1);
    let concert = agenda
        .timed
        .iter()
        .find(|item| item.item.kind == AgendaKind::Event)
        .unwrap();
    assert_eq!(concert.item.course_id, Some(course_id));
    assert_eq!(concert.item.notes, "Bring uniform");

    planner.delete_event(event_id).unwrap();
    assert!(planner.events().is_empty());
    assert_eq!(planner.courses().len(), 1);
}

#[test]
fn overrides_replace_by_date_and_drive_agenda() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    planner
        .add_course(&course_draft("Physics", &[Weekday::Fri]))
        .unwrap();
    // 2024-05-08 is a Wednesday.
    let wednesday = date(2024, 5, 8);

    assert!(planner
        .set_no_school(wednesday, Some("Teacher training".to_string()))
        .unwrap()
        .is_none());
    assert_eq!(planner.resolve_weekday(wednesday), None);

    let replaced = planner.set_day_schedule(wednesday, Weekday::Fri).unwrap();
    assert!(replaced.unwrap().is_no_school());
    assert_eq!(planner.overrides().len(), 1);
    assert_eq!(planner.agenda_for(wednesday).class_count(), 1);
    assert_eq!(planner.timeline_for(wednesday)[0].height, 75);

    let reloaded = self::planner(&conn);
    assert_eq!(reloaded.resolve_weekday(wednesday), Some(Weekday::Fri));

    assert!(planner.remove_override(wednesday).unwrap().is_some());
    assert!(planner.remove_override(wednesday).unwrap().is_none());
    assert_eq!(planner.resolve_weekday(wednesday), Some(Weekday::Wed));
    assert_eq!(planner.agenda_for(wednesday).class_count(), 0);
}

#[test]
fn failed_course_write_leaves_new_assignment_unsaved() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = failing_planner(&conn, "classes");

    let err = planner
        .add_assignment(&assignment_draft("Lab", "Chemistry"))
        .unwrap_err();

    assert!(matches!(err, PlannerError::Repo(_)));
    assert!(planner.assignments().is_empty());
    assert!(planner.courses().is_empty());
    assert_eq!(planner.store().get_item("assignments").unwrap(), None);
    assert_eq!(planner.store().get_item("classes").unwrap(), None);
}

#[test]
fn failed_assignment_write_keeps_course_name() {
    let conn = open_db_in_memory().unwrap();
    let (course_id, assignment_id) = {
        let mut planner = self::planner(&conn);
        let course_id = planner
            .add_course(&course_draft("Math", &[Weekday::Mon]))
            .unwrap();
        let assignment_id = planner
            .add_assignment(&assignment_draft("Limits", "Math"))
            .unwrap();
        (course_id, assignment_id)
    };
    let stored_classes = SqliteKvStore::try_new(&conn)
        .unwrap()
        .get_item("classes")
        .unwrap();

    let mut planner = failing_planner(&conn, "assignments");
    let err = planner
        .update_course(course_id, &course_draft("Calculus", &[Weekday::Mon]))
        .unwrap_err();

    assert!(matches!(err, PlannerError::Repo(_)));
    assert_eq!(planner.course(course_id).unwrap().name, "Math");
    assert_eq!(
        planner.assignment(assignment_id).unwrap().course_name,
        "Math"
    );
    assert_eq!(planner.store().get_item("classes").unwrap(), stored_classes);
}

#[test]
fn month_grid_counts_classes_through_overrides() {
    let conn = open_db_in_memory().unwrap();
    let mut planner = planner(&conn);
    planner
        .add_course(&course_draft("Chorus", &[Weekday::Mon]))
        .unwrap();
    planner
        .add_event(&EventDraft {
            title: "Open house".to_string(),
            date: Some(date(2024, 4, 3)),
            ..EventDraft::default()
        })
        .unwrap();
    // 2024-04-01 is a Monday, 2024-04-02 a Tuesday.
    planner.set_no_school(date(2024, 4, 1), None).unwrap();
    planner
        .set_day_schedule(date(2024, 4, 2), Weekday::Mon)
        .unwrap();

    let grid = planner.month_grid(2024, 4).unwrap();

    assert_eq!(grid.leading_blanks, 0);
    assert_eq!(grid.days.len(), 30);
    assert_eq!(grid.days[0].weekday, None);
    assert!(matches!(
        grid.days[0].override_kind,
        Some(OverrideKind::NoSchool { .. })
    ));
    assert_eq!(grid.days[0].class_count, 0);
    assert_eq!(grid.days[1].weekday, Some(Weekday::Mon));
    assert_eq!(grid.days[1].class_count, 1);
    assert_eq!(grid.days[2].event_count, 1);
    assert_eq!(grid.days[7].class_count, 1);
    assert!(planner.month_grid(2024, 13).is_none());
}
