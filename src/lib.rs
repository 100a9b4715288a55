//! Cache Facade - a typed cache over a key-value store
//!
//! Provides add-if-absent, overwrite, get-or-acquire and try-get semantics
//! with absolute expiry, backed by Redis or an in-process test store.

pub mod cache;
pub mod config;
pub mod error;
pub mod store;

pub use cache::{Cache, Codec, Expiry, JsonCodec};
pub use config::Config;
pub use error::{CacheError, Result};
pub use store::{MemoryStore, RedisStore, Store};
