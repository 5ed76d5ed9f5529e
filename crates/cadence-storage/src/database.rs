// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite key/value backend with WAL mode and an ordered change log.
//!
//! One connection per backend, guarded by a mutex: every read and write from
//! this process is serialized through it. Other processes open their own
//! backend on the same file and see each other's writes through the change log.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cadence_core::{CadenceError, ChangeRecord, KeyValueBackend};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::migrations::run_migrations;

/// Change log entries kept behind the newest one.
pub const CHANGE_LOG_RETENTION: i64 = 1000;

/// SQLite-backed [`KeyValueBackend`].
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    path: String,
}

impl SqliteBackend {
    /// Opens (creating if needed) the database at `path` and applies migrations.
    pub fn open(path: &str, wal_mode: bool) -> Result<Self, CadenceError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(CadenceError::storage)?;
            }
        }

        let mut conn = Connection::open(path).map_err(CadenceError::storage)?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(CadenceError::storage)?;
        if wal_mode {
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .map_err(CadenceError::storage)?;
            debug!(path, journal_mode = %mode, "journal mode set");
        }
        run_migrations(&mut conn)?;

        debug!(path, "SQLite backend opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_string(),
        })
    }

    /// Opens a private in-memory database. Nothing is shared with other backends.
    pub fn open_in_memory() -> Result<Self, CadenceError> {
        let mut conn = Connection::open_in_memory().map_err(CadenceError::storage)?;
        run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: ":memory:".to_string(),
        })
    }

    /// Path this backend was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Flushes the WAL into the main database file.
    pub fn checkpoint(&self) -> Result<(), CadenceError> {
        self.lock()
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(CadenceError::storage)?;
        debug!(path = %self.path, "WAL checkpoint complete");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // rusqlite rolls back any open transaction when a panic unwinds through
        // it, so the connection is usable after poisoning.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueBackend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn read(&self, key: &str) -> Result<Option<String>, CadenceError> {
        self.lock()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(CadenceError::storage)
    }

    fn write(&self, key: &str, value: &str, origin: &str) -> Result<(), CadenceError> {
        let mut conn = self.lock();
        let tx = conn.transaction().map_err(CadenceError::storage)?;
        tx.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )
        .map_err(CadenceError::storage)?;
        log_change(&tx, key, origin)?;
        tx.commit().map_err(CadenceError::storage)
    }

    fn delete(&self, key: &str, origin: &str) -> Result<(), CadenceError> {
        let mut conn = self.lock();
        let tx = conn.transaction().map_err(CadenceError::storage)?;
        let removed = tx
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(CadenceError::storage)?;
        if removed > 0 {
            log_change(&tx, key, origin)?;
        }
        tx.commit().map_err(CadenceError::storage)
    }

    fn latest_change(&self) -> Result<i64, CadenceError> {
        self.lock()
            .query_row("SELECT COALESCE(MAX(seq), 0) FROM kv_changes", [], |row| {
                row.get(0)
            })
            .map_err(CadenceError::storage)
    }

    fn changes_since(&self, after: i64) -> Result<Vec<ChangeRecord>, CadenceError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT c.seq, c.key, c.origin, s.value
                 FROM kv_changes c LEFT JOIN kv_store s ON s.key = c.key
                 WHERE c.seq > ?1
                 ORDER BY c.seq ASC",
            )
            .map_err(CadenceError::storage)?;
        let rows = stmt
            .query_map(params![after], |row| {
                Ok(ChangeRecord {
                    seq: row.get(0)?,
                    key: row.get(1)?,
                    origin: row.get(2)?,
                    value: row.get(3)?,
                })
            })
            .map_err(CadenceError::storage)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(CadenceError::storage)
    }

    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>, CadenceError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT key, value FROM kv_store
                 WHERE substr(key, 1, length(?1)) = ?1
                 ORDER BY key ASC",
            )
            .map_err(CadenceError::storage)?;
        let rows = stmt
            .query_map(params![prefix], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(CadenceError::storage)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(CadenceError::storage)
    }
}

fn log_change(tx: &rusqlite::Transaction<'_>, key: &str, origin: &str) -> Result<(), CadenceError> {
    tx.execute(
        "INSERT INTO kv_changes (key, origin) VALUES (?1, ?2)",
        params![key, origin],
    )
    .map_err(CadenceError::storage)?;
    let seq = tx.last_insert_rowid();
    tx.execute(
        "DELETE FROM kv_changes WHERE seq <= ?1",
        params![seq - CHANGE_LOG_RETENTION],
    )
    .map_err(CadenceError::storage)?;
    Ok(())
}
