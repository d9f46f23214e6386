//! SQLite-backed key-value medium.
//!
//! # Invariants
//! - All SQLite calls run on the blocking pool, never on the async scheduler.
//! - `set` is an upsert; a key maps to at most one row.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use async_trait::async_trait;
use log::error;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Durable key-value medium over the `kv_store` table.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        open_db(path).map(Self::new)
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    async fn with_conn<T, F>(&self, op: &'static str, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let result = tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StorageError::Poisoned)?;
            f(&guard).map_err(StorageError::from)
        })
        .await
        .map_err(|err| StorageError::TaskFailed(err.to_string()))?;

        if let Err(err) = &result {
            error!("event=kv_{op} module=storage status=error error={err}");
        }
        result
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let key = key.to_string();
        self.with_conn("get", move |conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let key = key.to_string();
        self.with_conn("set", move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )
            .map(|_| ())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKeyValueStore;
    use crate::storage::KeyValueStore;

    #[tokio::test]
    async fn set_then_get_roundtrips_and_upserts() {
        let store = SqliteKeyValueStore::open_in_memory().unwrap();
        assert_eq!(store.get("players").await.unwrap(), None);

        store.set("players", "[]".to_string()).await.unwrap();
        store.set("players", "[1]".to_string()).await.unwrap();
        assert_eq!(store.get("players").await.unwrap().as_deref(), Some("[1]"));
    }
}
