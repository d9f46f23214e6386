#![allow(dead_code)]

use async_trait::async_trait;
use player_core::{KeyValueStore, MemoryKeyValueStore, PlayerInput, StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Barrier, Notify};

pub fn ana() -> PlayerInput {
    PlayerInput::new("Ana", "ana@x.com", "abcdef", "abcdef")
}

pub fn bruno() -> PlayerInput {
    PlayerInput::new("Bruno", "bruno@x.com", "secret1", "secret1")
}

/// Medium whose writes (and optionally reads) can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("read refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("write refused".to_string()));
        }
        self.inner.set(key, value).await
    }
}

/// Medium whose `set` parks until released, to hold a write in flight.
#[derive(Default)]
pub struct GatedStore {
    pub inner: MemoryKeyValueStore,
    pub write_started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[async_trait]
impl KeyValueStore for GatedStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.write_started.notify_one();
        self.release.notified().await;
        self.inner.set(key, value).await
    }
}

/// Medium whose writes wait until two writers arrive, so both writers have
/// finished reading before either one writes.
pub struct PairedWritesStore {
    pub inner: MemoryKeyValueStore,
    writers: Barrier,
}

impl Default for PairedWritesStore {
    fn default() -> Self {
        Self {
            inner: MemoryKeyValueStore::new(),
            writers: Barrier::new(2),
        }
    }
}

#[async_trait]
impl KeyValueStore for PairedWritesStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.writers.wait().await;
        self.inner.set(key, value).await
    }
}
