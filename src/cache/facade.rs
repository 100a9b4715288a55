//! Cache Facade Module
//!
//! Typed add/set/get/try-get/remove over a pluggable [`Store`].

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cache::{Codec, Expiry, JsonCodec};
use crate::config::Config;
use crate::error::{AcquireError, CacheError, Result};
use crate::store::{RedisStore, Store};

// == Cache ==
/// Typed cache over a key-value [`Store`].
///
/// The facade keeps no entries of its own: every call goes to the store, so
/// several facades (in one process or many) can share a namespace. Cloning is
/// cheap and shares the store handle.
///
/// An optional namespace prefix is prepended verbatim to every key. It is
/// fixed at construction.
pub struct Cache<C = JsonCodec> {
    store: Arc<dyn Store>,
    codec: C,
    prefix: Arc<str>,
}

impl<C: Clone> Clone for Cache<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: self.codec.clone(),
            prefix: Arc::clone(&self.prefix),
        }
    }
}

impl Cache<JsonCodec> {
    // == Constructors ==
    /// Creates an unprefixed JSON cache over `store`.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_codec(store, "", JsonCodec)
    }

    /// Creates a JSON cache whose keys are all prefixed with `prefix`.
    pub fn with_prefix(store: Arc<dyn Store>, prefix: impl Into<String>) -> Self {
        Self::with_codec(store, prefix, JsonCodec)
    }

    /// Connects a JSON cache to the Redis server named in `config`.
    pub async fn connect(config: &Config) -> Result<Self> {
        let store = RedisStore::connect(&config.redis_connect, config.operation_timeout).await?;
        Ok(Self::with_prefix(
            Arc::new(store),
            config.prefix.clone().unwrap_or_default(),
        ))
    }
}

impl<C: Codec> Cache<C> {
    pub fn with_codec(store: Arc<dyn Store>, prefix: impl Into<String>, codec: C) -> Self {
        Self {
            store,
            codec,
            prefix: Arc::from(prefix.into()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the key as sent to the store.
    pub fn namespaced_key(&self, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument(
                "key must not be empty".to_string(),
            ));
        }
        Ok(format!("{}{}", self.prefix, key))
    }

    // == Add ==
    /// Stores `value` only if `key` has no live entry.
    ///
    /// Fails with [`CacheError::AlreadyExists`] when it does; the existing
    /// entry is left untouched. The existence check and the write are one
    /// atomic store operation.
    pub async fn add<T>(&self, key: &str, value: &T, expiry: impl Into<Expiry>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let (full_key, expires_at) = self.write_target(key, expiry.into())?;
        let payload = self.encode_value(value)?;

        if !self.store.set_if_absent(&full_key, payload, expires_at).await? {
            debug!(key = %full_key, "cache add rejected, live entry present");
            return Err(CacheError::AlreadyExists(key.to_string()));
        }
        debug!(key = %full_key, expires_at = %expires_at.to_rfc3339(), "cache add");
        Ok(())
    }

    // == Set ==
    /// Stores `value`, replacing any prior value and expiry for `key`.
    pub async fn set<T>(&self, key: &str, value: &T, expiry: impl Into<Expiry>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let (full_key, expires_at) = self.write_target(key, expiry.into())?;
        let payload = self.encode_value(value)?;

        self.store.set(&full_key, payload, expires_at).await?;
        debug!(key = %full_key, expires_at = %expires_at.to_rfc3339(), "cache set");
        Ok(())
    }

    // == Remove ==
    /// Deletes the entry for `key`. Absent keys are not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let full_key = self.namespaced_key(key)?;
        let removed = self.store.delete(&full_key).await?;
        debug!(key = %full_key, removed, "cache remove");
        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key` decoded as `T`.
    ///
    /// On a miss, a `T` that can represent absence yields that representation;
    /// any other `T` fails with [`CacheError::NoValue`]. With [`JsonCodec`]
    /// that is every type deserializable from `null`: `Option<U>` gives
    /// `None`, unit structs give themselves and `serde_json::Value` gives
    /// `Value::Null`. A payload that does not decode as `T` fails
    /// with [`CacheError::TypeMismatch`].
    ///
    /// ```ignore
    /// let maybe: Option<User> = cache.get("user").await?;
    /// let user: User = cache.get("user").await?; // NoValue on a miss
    /// ```
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let full_key = self.namespaced_key(key)?;
        match self.store.get(&full_key).await? {
            Some(payload) => self.decode_payload(key, &payload),
            None => {
                debug!(key = %full_key, "cache miss");
                self.codec
                    .absent::<T>()
                    .ok_or_else(|| CacheError::NoValue(key.to_string()))
            }
        }
    }

    // == Get Or Acquire ==
    /// Returns the cached value, computing and storing it with `acquire` when needed.
    ///
    /// With `refresh_force` false, `acquire` runs only on a miss. With it
    /// true, `acquire` always runs and its result overwrites the entry. The
    /// new value is stored through [`Cache::set`] with `expiry`.
    ///
    /// Concurrent callers that miss on the same key each run `acquire` and
    /// the last write wins; there is no coalescing.
    pub async fn get_or_acquire<T, F, Fut, E>(
        &self,
        key: &str,
        acquire: F,
        expiry: impl Into<Expiry>,
        refresh_force: bool,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<AcquireError>,
    {
        let expiry = expiry.into();
        let (full_key, _) = self.write_target(key, expiry)?;

        if !refresh_force {
            if let Some(payload) = self.store.get(&full_key).await? {
                return self.decode_payload(key, &payload);
            }
        }

        debug!(key = %full_key, refresh_force, "cache acquire");
        let value = acquire().await.map_err(|source| CacheError::Acquire {
            key: key.to_string(),
            source: source.into(),
        })?;
        self.set(key, &value, expiry).await?;
        Ok(value)
    }

    // == Try Get ==
    /// Returns the live value for `key`, or `None` if there is none.
    ///
    /// A payload that does not decode as `T` is also reported as `None`.
    /// Only an empty key and store failures are errors.
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.namespaced_key(key)?;
        let Some(payload) = self.store.get(&full_key).await? else {
            return Ok(None);
        };
        match self.codec.decode::<T>(&payload) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                debug!(key = %full_key, error = %err, "cache try_get type mismatch");
                Ok(None)
            }
        }
    }

    // == Contains ==
    /// Returns true if `key` has a live entry.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        let full_key = self.namespaced_key(key)?;
        self.store.exists(&full_key).await
    }

    // == Helpers ==
    fn write_target(&self, key: &str, expiry: Expiry) -> Result<(String, DateTime<Utc>)> {
        let full_key = self.namespaced_key(key)?;
        let expires_at = expiry.validate(Utc::now())?;
        Ok((full_key, expires_at))
    }

    fn encode_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let payload = self
            .codec
            .encode(value)
            .map_err(|err| CacheError::Serialization(err.to_string()))?;
        if self.codec.is_null(&payload) {
            return Err(CacheError::InvalidArgument(
                "value must not be null".to_string(),
            ));
        }
        Ok(payload)
    }

    fn decode_payload<T: DeserializeOwned>(&self, key: &str, payload: &[u8]) -> Result<T> {
        self.codec
            .decode(payload)
            .map_err(|err| CacheError::TypeMismatch {
                key: key.to_string(),
                reason: err.to_string(),
            })
    }
}
