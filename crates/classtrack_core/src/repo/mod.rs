//! Repository layer: key-value storage and collection persistence.
//!
//! # Responsibility
//! - Define the key-value storage contract used by the planner.
//! - Encode/decode whole record collections as JSON arrays.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Loading never fails because of malformed stored content; only storage
//!   transport failures surface as errors.
//! - Saving overwrites the whole collection under its key.

pub mod collection;
pub mod kv_store;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level failure for planner persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// Connection is not ready for planner storage.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "collection serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid planner storage: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
