//! SQLite bootstrap for the durable key-value medium.
//!
//! Connections are opened here, given a busy timeout and migrated before
//! `SqliteKeyValueStore` sees them. Failures are reported as `StorageError`
//! so the medium has a single error type end to end.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
