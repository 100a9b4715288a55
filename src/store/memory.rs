//! In-Process Store Module
//!
//! HashMap storage with absolute TTL expiration and an optional capacity bound.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::recency::RecencyIndex;
use super::{ensure_unexpired, Store, StoredEntry};
use crate::error::Result;

// == Entries ==
/// Lock-protected state of a [`MemoryStore`].
#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, StoredEntry>,
    recency: RecencyIndex,
    max_entries: Option<usize>,
}

impl Entries {
    /// Returns the live entry for `key`, dropping it first if it has elapsed.
    fn live(&mut self, key: &str, now: DateTime<Utc>) -> Option<&StoredEntry> {
        if self.map.get(key)?.is_expired_at(now) {
            self.map.remove(key);
            self.recency.remove(key);
            return None;
        }
        self.recency.touch(key);
        self.map.get(key)
    }

    fn insert(&mut self, key: &str, entry: StoredEntry) {
        if !self.map.contains_key(key) {
            if let Some(max) = self.max_entries {
                while self.map.len() >= max {
                    let Some(evicted) = self.recency.pop_oldest() else {
                        break;
                    };
                    self.map.remove(&evicted);
                    warn!(key = %evicted, max_entries = max, "evicted least recently used entry");
                }
            }
        }
        self.map.insert(key.to_string(), entry);
        self.recency.touch(key);
    }
}

// == Memory Store ==
/// In-process [`Store`] backing for tests and single-process use.
///
/// Elapsed entries are invisible and dropped when next touched. With a
/// capacity bound, inserting a new key into a full store evicts the least
/// recently used entry, which the facade observes exactly like an external
/// eviction in a remote store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Entries>,
}

impl MemoryStore {
    // == Constructors ==
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding at most `max_entries` entries (at least one).
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: RwLock::new(Entries {
                max_entries: Some(max_entries.max(1)),
                ..Entries::default()
            }),
        }
    }

    /// Number of entries held, including elapsed ones not yet dropped.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.map.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn set_if_absent(
        &self,
        key: &str,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        ensure_unexpired(key, expires_at, now)?;
        if inner.live(key, now).is_some() {
            return Ok(false);
        }
        inner.insert(key, StoredEntry::new(payload, expires_at));
        Ok(true)
    }

    async fn set(&self, key: &str, payload: Vec<u8>, expires_at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write().await;
        ensure_unexpired(key, expires_at, Utc::now())?;
        inner.insert(key, StoredEntry::new(payload, expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Utc::now();
        // Write lock: reads update recency
        let mut inner = self.inner.write().await;
        Ok(inner.live(key, now).map(|entry| entry.payload.clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        inner.recency.remove(key);
        let removed = inner
            .map
            .remove(key)
            .is_some_and(|entry| !entry.is_expired_at(now));
        debug!(key, removed, "memory store delete");
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let now = Utc::now();
        Ok(self.inner.write().await.live(key, now).is_some())
    }
}
