//! Store Module
//!
//! The key-value collaborator behind the cache facade, plus its backings:
//! a Redis client and an in-process map used as a test double.

mod entry;
mod memory;
mod recency;
mod remote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{CacheError, Result};

// Re-export public types
pub use entry::StoredEntry;
pub use memory::MemoryStore;
pub use remote::{connection_url, RedisStore, DEFAULT_REDIS_PORT};

// == Store Trait ==
/// Operations a backing key-value store must provide.
///
/// Keys arrive fully namespaced and payloads are opaque bytes. Every write
/// carries an absolute UTC expiry; an entry is invisible once that instant
/// has been reached. A write whose expiry is already reached when the store
/// receives it fails with [`CacheError::InvalidArgument`] and stores nothing.
#[async_trait]
pub trait Store: Send + Sync {
    /// Stores `payload` only if no live entry exists. Returns false if one did.
    async fn set_if_absent(
        &self,
        key: &str,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Stores `payload`, replacing any prior value and expiry.
    async fn set(&self, key: &str, payload: Vec<u8>, expires_at: DateTime<Utc>) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Deletes the entry. Returns true if a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Rejects a write whose expiry was reached between validation and the store call.
pub(crate) fn ensure_unexpired(
    key: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<()> {
    if expires_at <= now {
        return Err(elapsed_before_write(key));
    }
    Ok(())
}

pub(crate) fn elapsed_before_write(key: &str) -> CacheError {
    CacheError::InvalidArgument(format!(
        "expiry for {key} elapsed before the write reached the store"
    ))
}
