// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do NOT open additional connections for writes.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rusqlite::{Transaction, TransactionBehavior};
use tracing::debug;
use vaultkeep_core::VaultkeepError;

use crate::migrations;

/// Convert a tokio-rusqlite error into `VaultkeepError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VaultkeepError {
    VaultkeepError::storage(e)
}

/// Handle to the migrated SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and apply migrations.
    ///
    /// Migrations and the journal mode are applied on a short-lived blocking
    /// connection before the long-lived async one is opened.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, VaultkeepError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(VaultkeepError::storage)?;
            }
        }

        let setup_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), VaultkeepError> {
            let mut conn =
                rusqlite::Connection::open(&setup_path).map_err(VaultkeepError::storage)?;
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.execute_batch(&format!("PRAGMA journal_mode = {journal};"))
                .map_err(VaultkeepError::storage)?;
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| VaultkeepError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(VaultkeepError::storage)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The async connection all queries run through.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Run a mutation in an IMMEDIATE transaction that commits only while
    /// the calling future is still alive.
    ///
    /// Dropping the returned future before the background thread reaches
    /// the commit rolls the transaction back, so an abandoned request
    /// leaves no trace. A drop after the commit keeps the change.
    pub async fn write<T, F>(&self, mutation: F) -> Result<T, VaultkeepError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        let abandoned = Arc::new(AtomicBool::new(false));
        let _guard = AbandonOnDrop(Arc::clone(&abandoned));

        let outcome = self
            .conn
            .call(move |conn| -> Result<Option<T>, rusqlite::Error> {
                if abandoned.load(Ordering::Acquire) {
                    return Ok(None);
                }
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let value = mutation(&tx)?;
                if abandoned.load(Ordering::Acquire) {
                    debug!("caller went away, rolling back");
                    return Ok(None);
                }
                tx.commit()?;
                Ok(Some(value))
            })
            .await
            .map_err(map_tr_err)?;

        outcome.ok_or_else(|| VaultkeepError::Internal("write abandoned before commit".to_string()))
    }
}

/// Marks a pending write abandoned when the awaiting future is dropped.
struct AbandonOnDrop(Arc<AtomicBool>);

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Current UTC time in the fixed-width RFC 3339 form stored in every table.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vault.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert!(tables.contains(&"accounts".to_string()));
        assert!(tables.contains(&"vault_items".to_string()));
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let path = path.to_str().unwrap();
        drop(Database::open(path, true).await.unwrap());
        assert!(Database::open(path, true).await.is_ok());
    }

    #[tokio::test]
    async fn wal_mode_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    async fn count_rows(db: &Database) -> i64 {
        db.connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))
            })
            .await
            .unwrap()
    }

    fn insert_account(tx: &Transaction<'_>, id: &str) -> Result<(), rusqlite::Error> {
        tx.execute(
            "INSERT INTO accounts (id, login, password_hash, wrapped_key, created_at)
             VALUES (?1, ?1, 'h', 'k', '2026-01-01T00:00:00.000Z')",
            [id],
        )?;
        Ok(())
    }

    #[tokio::test]
    async fn write_commits_when_awaited() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();

        db.write(|tx| insert_account(tx, "a1")).await.unwrap();
        assert_eq!(count_rows(&db).await, 1);
    }

    #[tokio::test]
    async fn dropped_write_rolls_back_while_blocked_on_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();

        // A second connection holds the write lock past the caller's deadline.
        let blocker = rusqlite::Connection::open(&path).unwrap();
        blocker.execute_batch("BEGIN IMMEDIATE;").unwrap();

        let attempt = tokio::time::timeout(
            std::time::Duration::from_millis(300),
            db.write(|tx| insert_account(tx, "late")),
        )
        .await;
        assert!(attempt.is_err(), "write should still be waiting on the lock");

        blocker.execute_batch("COMMIT;").unwrap();

        // Queued behind the abandoned write on the same connection thread.
        assert_eq!(count_rows(&db).await, 0);
    }

    #[test]
    fn timestamps_sort_lexically() {
        let a = now_timestamp();
        let b = now_timestamp();
        assert!(a <= b);
        assert!(a.ends_with('Z'));
    }
}
