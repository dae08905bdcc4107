//! Course set reconciliation with assignment course names.
//!
//! Assignments name their course in free text. Any name without a matching
//! course record (case-insensitive) gets a placeholder course with an empty
//! schedule.

use crate::model::assignment::Assignment;
use crate::model::course::{course_name_key, Course};
use std::collections::HashSet;

/// Drops later courses whose name collides (case-insensitive) with an
/// earlier one.
fn dedupe_courses(courses: Vec<Course>) -> Vec<Course> {
    let mut seen = HashSet::with_capacity(courses.len());
    courses
        .into_iter()
        .filter(|course| seen.insert(course.name_key()))
        .collect()
}

/// Merges assignment course names into `courses`, sorted by name.
///
/// Returns the merged set and the number of synthesized placeholders.
pub fn merge_courses(courses: Vec<Course>, assignments: &[Assignment]) -> (Vec<Course>, usize) {
    let mut merged = dedupe_courses(courses);
    let mut known = merged
        .iter()
        .map(Course::name_key)
        .collect::<HashSet<_>>();

    let mut synthesized = 0;
    for assignment in assignments {
        let key = course_name_key(&assignment.course_name);
        if key.is_empty() || known.contains(&key) {
            continue;
        }
        known.insert(key);
        merged.push(Course::placeholder(&assignment.course_name));
        synthesized += 1;
    }

    sort_courses(&mut merged);
    (merged, synthesized)
}

/// Ordinal sort by name.
pub fn sort_courses(courses: &mut [Course]) {
    courses.sort_by(|a, b| a.name.cmp(&b.name));
}
