//! Cache Module
//!
//! Typed cache facade with add-if-absent, overwrite, get-or-acquire and
//! try-get semantics, plus the codec and expiry types it is built on.

mod codec;
mod expiry;
mod facade;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use codec::{Codec, JsonCodec};
pub use expiry::Expiry;
pub use facade::Cache;
