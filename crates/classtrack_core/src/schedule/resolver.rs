//! Override table and per-date weekday resolution.
//!
//! # Responsibility
//! - Hold at most one school override per calendar date.
//! - Decide which weekday's class schedule applies on a date.
//!
//! # Invariants
//! - Inserting an override for an occupied date replaces the previous one.
//! - Every schedule view (day agenda, month grid, next class) resolves
//!   weekdays through [`OverrideTable::resolve_weekday`].

use crate::model::school_override::{OverrideKind, SchoolOverride};
use crate::model::time::natural_weekday;
use chrono::{NaiveDate, Weekday};
use std::collections::HashMap;

/// Date-keyed school overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    by_date: HashMap<NaiveDate, SchoolOverride>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from records in stored order; later records win on
    /// date collisions.
    pub fn from_records(records: impl IntoIterator<Item = SchoolOverride>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.insert(record);
        }
        table
    }

    /// Stores `record`, returning the override it replaced, if any.
    pub fn insert(&mut self, record: SchoolOverride) -> Option<SchoolOverride> {
        self.by_date.insert(record.date, record)
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<SchoolOverride> {
        self.by_date.remove(&date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&SchoolOverride> {
        self.by_date.get(&date)
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Overrides sorted by date, the order used for persistence and lists.
    pub fn to_sorted_vec(&self) -> Vec<SchoolOverride> {
        let mut records = self.by_date.values().cloned().collect::<Vec<_>>();
        records.sort_by_key(|record| record.date);
        records
    }

    /// Weekday whose schedule applies on `date`, or `None` for no school.
    pub fn resolve_weekday(&self, date: NaiveDate) -> Option<Weekday> {
        match self.get(date).map(|record| &record.kind) {
            Some(OverrideKind::NoSchool { .. }) => None,
            Some(OverrideKind::DaySchedule {
                weekday: Some(weekday),
            }) => Some(*weekday),
            Some(OverrideKind::DaySchedule { weekday: None }) | None => {
                Some(natural_weekday(date))
            }
        }
    }
}
