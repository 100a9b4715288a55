//! Configuration Module
//!
//! Loads cache connection settings from environment variables or a JSON settings file.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Connection string used when none is configured.
pub const DEFAULT_REDIS_CONNECT: &str = "redis://127.0.0.1:6379";

// == Config ==
/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Redis URL or bare `host[:port]`
    pub redis_connect: String,
    /// Namespace prefix prepended to every key
    pub prefix: Option<String>,
    /// Per-call timeout for store operations, none means wait indefinitely
    pub operation_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_connect: DEFAULT_REDIS_CONNECT.to_string(),
            prefix: None,
            operation_timeout: None,
        }
    }
}

/// Shape of the JSON settings file.
#[derive(Debug, Deserialize)]
struct SettingsFile {
    redis: RedisSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedisSection {
    redis_connect: String,
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    operation_timeout_ms: Option<u64>,
}

impl Config {
    /// Creates a Config from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_CONNECT` - Redis connection string (default: redis://127.0.0.1:6379)
    /// - `CACHE_PREFIX` - Key namespace prefix (default: none)
    /// - `CACHE_OPERATION_TIMEOUT_MS` - Per-call timeout in milliseconds (default: none)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a Config from any variable source, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            redis_connect: non_empty("REDIS_CONNECT").unwrap_or(defaults.redis_connect),
            prefix: non_empty("CACHE_PREFIX"),
            operation_timeout: non_empty("CACHE_OPERATION_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_millis),
        }
    }

    /// Loads a Config from a JSON settings file.
    ///
    /// ```json
    /// { "redis": { "redisConnect": "127.0.0.1:6379", "prefix": "app:" } }
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            CacheError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let settings: SettingsFile = serde_json::from_str(text)
            .map_err(|err| CacheError::Config(format!("invalid settings: {err}")))?;
        let redis = settings.redis;

        Ok(Self {
            redis_connect: redis.redis_connect,
            prefix: redis.prefix.filter(|p| !p.is_empty()),
            operation_timeout: redis.operation_timeout_ms.map(Duration::from_millis),
        })
    }
}
