//! Whole-collection persistence for planner records.
//!
//! # Responsibility
//! - Map each record type to its storage key.
//! - Decode stored JSON arrays defensively, dropping malformed elements.
//! - Encode collections for unconditional overwrite on save.
//!
//! # Invariants
//! - A missing key, a non-array value or unparseable JSON decodes to an
//!   empty collection.
//! - Each element is deserialized and validated on its own; one bad element
//!   never discards its neighbours.
//! - Only missing identity or required fields drop an element. Repairable
//!   content is normalized in place.

use crate::model::assignment::Assignment;
use crate::model::course::Course;
use crate::model::event::CalendarEvent;
use crate::model::school_override::SchoolOverride;
use crate::model::validation::{require_text, RecordValidationError};
use crate::repo::kv_store::KvStore;
use crate::repo::RepoResult;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Storage key for each independently persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Assignments,
    Classes,
    Events,
    Overrides,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Self::Assignments => "assignments",
            Self::Classes => "classes",
            Self::Events => "events",
            Self::Overrides => "overrides",
        }
    }
}

/// A record type stored as one element of a collection.
pub trait PersistedRecord: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    /// Post-deserialization checks serde cannot express, such as blank titles.
    fn validate_record(&self) -> Result<(), RecordValidationError> {
        Ok(())
    }

    /// Repairs a kept record so it satisfies the in-memory invariants.
    fn normalize_record(&mut self) {}
}

impl PersistedRecord for Assignment {
    const COLLECTION: Collection = Collection::Assignments;

    fn validate_record(&self) -> Result<(), RecordValidationError> {
        self.validate()
    }

    fn normalize_record(&mut self) {
        self.normalize_completion();
    }
}

impl PersistedRecord for Course {
    const COLLECTION: Collection = Collection::Classes;

    fn validate_record(&self) -> Result<(), RecordValidationError> {
        require_text("name", &self.name)
    }

    fn normalize_record(&mut self) {
        self.normalize_schedule();
    }
}

impl PersistedRecord for CalendarEvent {
    const COLLECTION: Collection = Collection::Events;

    fn validate_record(&self) -> Result<(), RecordValidationError> {
        self.validate()
    }
}

impl PersistedRecord for SchoolOverride {
    const COLLECTION: Collection = Collection::Overrides;
}

/// Result of decoding one stored collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCollection<T> {
    /// Valid records in stored order.
    pub records: Vec<T>,
    /// Number of elements discarded as malformed.
    pub dropped: usize,
}

impl<T> Default for DecodedCollection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            dropped: 0,
        }
    }
}

/// Decodes a raw stored value into valid records.
pub fn decode_collection<T: PersistedRecord>(raw: &str) -> DecodedCollection<T> {
    let Ok(Value::Array(elements)) = serde_json::from_str::<Value>(raw) else {
        return DecodedCollection::default();
    };

    let total = elements.len();
    let records = elements
        .into_iter()
        .filter_map(|element| serde_json::from_value::<T>(element).ok())
        .filter(|record| record.validate_record().is_ok())
        .map(|mut record| {
            record.normalize_record();
            record
        })
        .collect::<Vec<_>>();

    DecodedCollection {
        dropped: total - records.len(),
        records,
    }
}

/// Loads one collection from storage.
///
/// # Errors
/// - Only storage transport failures; content problems yield fewer records.
pub fn load_collection<T: PersistedRecord>(store: &impl KvStore) -> RepoResult<Vec<T>> {
    let key = T::COLLECTION.key();
    let Some(raw) = store.get_item(key)? else {
        debug!("event=collection_load module=repo status=empty key={key}");
        return Ok(Vec::new());
    };

    let decoded = decode_collection::<T>(&raw);
    if decoded.dropped > 0 {
        warn!(
            "event=collection_load module=repo status=partial key={key} kept={} dropped={}",
            decoded.records.len(),
            decoded.dropped
        );
    } else {
        debug!(
            "event=collection_load module=repo status=ok key={key} kept={}",
            decoded.records.len()
        );
    }
    Ok(decoded.records)
}

/// Encodes one collection as its storage key and JSON array value.
pub fn encode_collection<T: PersistedRecord>(records: &[T]) -> RepoResult<(&'static str, String)> {
    Ok((T::COLLECTION.key(), serde_json::to_string(records)?))
}

/// Overwrites one collection in storage.
pub fn save_collection<T: PersistedRecord>(
    store: &impl KvStore,
    records: &[T],
) -> RepoResult<()> {
    let (key, encoded) = encode_collection(records)?;
    store.set_item(key, &encoded)?;
    debug!(
        "event=collection_save module=repo status=ok key={key} count={}",
        records.len()
    );
    Ok(())
}
