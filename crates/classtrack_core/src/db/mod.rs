//! Planner store bootstrap.
//!
//! The planner keeps every collection in a single `kv_store` table. This
//! module owns the connection lifecycle and the schema version of that table.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - No collection is read or written on a connection that failed migration.
//! - A store file's parent directory exists before SQLite opens it.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open or prepare the planner store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The directory that should hold the store file could not be created.
    StoreDirectory { path: PathBuf, source: io::Error },
    /// The file was written by a newer ClassTrack build.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "planner store error: {err}"),
            Self::StoreDirectory { path, source } => {
                write!(f, "cannot create store directory `{}`: {source}", path.display())
            }
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "planner store has schema version {found}; this build reads up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::StoreDirectory { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
