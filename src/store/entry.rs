//! Stored Entry Module
//!
//! A payload held by the in-process store together with its absolute expiry.

use chrono::{DateTime, Utc};

// == Stored Entry ==
/// Represents a single stored payload with its expiry metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    /// Opaque encoded value
    pub payload: Vec<u8>,
    /// Absolute instant after which the entry is gone
    pub expires_at: DateTime<Utc>,
}

impl StoredEntry {
    // == Constructor ==
    pub fn new(payload: Vec<u8>, expires_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so it is never visible
    /// at its own expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
