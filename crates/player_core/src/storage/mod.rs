//! Asynchronous key-value storage medium.
//!
//! # Responsibility
//! - Define the opaque `get`/`set` contract the record store persists through.
//! - Provide an in-memory medium and a durable SQLite medium.
//!
//! # Invariants
//! - Each call is atomic for its single key; nothing spans several calls.
//! - Implementations never block the async scheduler thread.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a storage medium call.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// The database was written by a newer build; migrations are forward-only.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// A previous holder of the connection lock panicked.
    Poisoned,
    /// The blocking worker running the call did not complete.
    TaskFailed(String),
    /// Medium-specific failure for implementations outside this crate.
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "player database schema {found} is newer than this build supports ({supported})"
            ),
            Self::Poisoned => write!(f, "storage connection lock poisoned"),
            Self::TaskFailed(message) => write!(f, "storage task failed: {message}"),
            Self::Backend(message) => write!(f, "storage backend error: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Opaque durable key-value medium.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> StorageResult<()>;
}
