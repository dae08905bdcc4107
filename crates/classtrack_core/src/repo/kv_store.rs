//! Key-value storage contract and SQLite implementation.
//!
//! Mirrors browser-style local storage: string keys, string values, whole
//! value replacement on every write.
//!
//! # Invariants
//! - `set_items` writes every entry or none of them.

use crate::repo::{RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Synchronous string key-value storage.
pub trait KvStore {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Removes `key`; removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> RepoResult<()>;
    /// All stored keys in ascending order.
    fn keys(&self) -> RepoResult<Vec<String>>;

    /// Writes several keys as one unit.
    ///
    /// The default restores the prior value of every key already written
    /// when a later write fails. Stores with native transactions override it.
    fn set_items(&self, entries: &[(&str, String)]) -> RepoResult<()> {
        let previous = entries
            .iter()
            .map(|(key, _)| self.get_item(key))
            .collect::<RepoResult<Vec<_>>>()?;

        for (written, (key, value)) in entries.iter().enumerate() {
            if let Err(err) = self.set_item(key, value) {
                for ((key, _), prior) in entries[..written].iter().zip(&previous) {
                    let restored = match prior {
                        Some(prior) => self.set_item(key, prior),
                        None => self.remove_item(key),
                    };
                    if let Err(restore_err) = restored {
                        warn!(
                            "event=kv_batch_restore module=repo status=error key={key} error={restore_err}"
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// SQLite-backed key-value store over the `kv_store` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `RepoError::InvalidData` when the `kv_store` table is missing, which
    ///   means the connection skipped migrations.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::InvalidData(
                "kv_store table missing; open the connection with open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        upsert_item(self.conn, key, value)
    }

    fn remove_item(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn keys(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn set_items(&self, entries: &[(&str, String)]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for (key, value) in entries {
            upsert_item(&tx, key, value)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn upsert_item(conn: &Connection, key: &str, value: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![key, value],
    )?;
    Ok(())
}
