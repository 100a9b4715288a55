//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Boxed error returned by a get-or-acquire producer.
pub type AcquireError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Empty key, null value, unusable expiry or null producer result
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `add` hit a live entry
    #[error("Key already exists: {0}")]
    AlreadyExists(String),

    /// Entry absent and the requested type cannot represent absence
    #[error("No value for key: {0}")]
    NoValue(String),

    /// Stored payload does not decode as the requested type
    #[error("Type mismatch for key {key}: {reason}")]
    TypeMismatch { key: String, reason: String },

    /// Value could not be encoded for storage
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The get-or-acquire producer failed
    #[error("Acquire failed for key {key}: {source}")]
    Acquire {
        key: String,
        #[source]
        source: AcquireError,
    },

    /// Backing store did not answer within the configured timeout
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Backing store returned a transport-level failure
    #[error("Transport error: {0}")]
    Transport(#[from] redis::RedisError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Returns true for failures caused by the backing store rather than the caller.
    pub fn is_transport(&self) -> bool {
        matches!(self, CacheError::Transport(_) | CacheError::Unavailable(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
