//! Codec Module
//!
//! Converts typed values to and from the opaque payloads kept by a store.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

// == Codec Trait ==
/// Pluggable payload format used by [`Cache`](crate::cache::Cache).
///
/// Implementations must round-trip: `decode(encode(v)) == v` for every
/// value shape they accept.
pub trait Codec: Send + Sync + 'static {
    /// Error produced when encoding or decoding fails.
    type Error: std::error::Error + Send + Sync + 'static;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Self::Error>;

    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T, Self::Error>;

    /// Returns true if `payload` is the encoding of a null value.
    fn is_null(&self, payload: &[u8]) -> bool;

    /// Returns how `T` represents "no value", or `None` if it cannot.
    ///
    /// For [`JsonCodec`] this is whatever `T` deserializes from JSON `null`:
    /// `Option<_>`, `()`, unit structs and `serde_json::Value` (as `Null`)
    /// represent absence, while structs with fields, numbers and strings do not.
    fn absent<T: DeserializeOwned>(&self) -> Option<T>;
}

// == JSON Codec ==
/// serde_json payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    type Error = serde_json::Error;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(value)
    }

    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T, Self::Error> {
        serde_json::from_slice(payload)
    }

    fn is_null(&self, payload: &[u8]) -> bool {
        std::str::from_utf8(payload).is_ok_and(|text| text.trim() == "null")
    }

    fn absent<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(Value::Null).ok()
    }
}
