//! Redis Store Module
//!
//! [`Store`] backed by a Redis server through a shared async connection manager.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{Client, Cmd, FromRedisValue, RedisResult};
use tracing::{debug, info, warn};

use super::{elapsed_before_write, Store};
use crate::error::{CacheError, Result};

/// Port assumed when a bare host is given as the connection string.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

// == Connection URL ==
/// Turns a connection string into a Redis URL.
///
/// Accepts a `redis://`, `rediss://` or `unix://` URL as-is, or a bare
/// `host[:port]` which is given the `redis://` scheme and the default port.
pub fn connection_url(connection: &str) -> Result<String> {
    let connection = connection.trim();
    if connection.is_empty() {
        return Err(CacheError::Config(
            "Redis connection string is empty".to_string(),
        ));
    }
    if connection.contains("://") {
        return Ok(connection.to_string());
    }
    if connection.contains(':') {
        Ok(format!("redis://{connection}"))
    } else {
        Ok(format!("redis://{connection}:{DEFAULT_REDIS_PORT}"))
    }
}

/// Milliseconds from `now` until `expires_at` as a `PX` argument.
///
/// Less than a whole millisecond left counts as elapsed.
fn px_millis(key: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<i64> {
    let millis = (expires_at - now).num_milliseconds();
    if millis < 1 {
        return Err(elapsed_before_write(key));
    }
    Ok(millis)
}

// == Redis Store ==
/// Remote [`Store`] backing.
///
/// The connection manager is created once in [`RedisStore::connect`] and
/// each call works on a clone of its handle. Reconnection after a dropped
/// connection is left to the manager; failed calls are not retried here.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    operation_timeout: Option<Duration>,
}

impl RedisStore {
    // == Connect ==
    /// Opens a connection to the server named by `connection`.
    ///
    /// `operation_timeout` bounds the initial connect and every later call;
    /// exceeding it yields [`CacheError::Unavailable`].
    pub async fn connect(connection: &str, operation_timeout: Option<Duration>) -> Result<Self> {
        let url = connection_url(connection)?;
        let client = Client::open(url.as_str())?;
        let conn = bounded(operation_timeout, "CONNECT", ConnectionManager::new(client)).await?;
        info!(
            addr = %client_addr(&url),
            timeout_ms = operation_timeout.map(|t| t.as_millis() as u64),
            "Connected to Redis"
        );
        Ok(Self {
            conn,
            operation_timeout,
        })
    }

    async fn run<T: FromRedisValue + Send>(&self, name: &'static str, cmd: Cmd) -> Result<T> {
        let mut conn = self.conn.clone();
        bounded(self.operation_timeout, name, async move {
            let reply: T = cmd.query_async(&mut conn).await?;
            Ok(reply)
        })
        .await
    }
}

/// Awaits `fut`, turning an elapsed timeout into [`CacheError::Unavailable`].
async fn bounded<T, F>(timeout: Option<Duration>, name: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = RedisResult<T>>,
{
    let Some(limit) = timeout else {
        return Ok(fut.await?);
    };
    match tokio::time::timeout(limit, fut).await {
        Ok(reply) => Ok(reply?),
        Err(_) => {
            warn!(command = name, ?limit, "Redis call timed out");
            Err(CacheError::Unavailable(format!(
                "{name} did not complete within {limit:?}"
            )))
        }
    }
}

/// Host part of a Redis URL for logging, without credentials.
fn client_addr(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}

#[async_trait]
impl Store for RedisStore {
    async fn set_if_absent(
        &self,
        key: &str,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key)
            .arg(payload.as_slice())
            .arg("NX")
            .arg("PX")
            .arg(px_millis(key, expires_at, Utc::now())?);
        // Nil reply means the key already held a live value
        let reply: Option<String> = self.run("SET NX", cmd).await?;
        debug!(key, stored = reply.is_some(), "redis set if absent");
        Ok(reply.is_some())
    }

    async fn set(&self, key: &str, payload: Vec<u8>, expires_at: DateTime<Utc>) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key)
            .arg(payload.as_slice())
            .arg("PX")
            .arg(px_millis(key, expires_at, Utc::now())?);
        self.run::<()>("SET", cmd).await?;
        debug!(key, "redis set");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.run("GET", cmd).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        let removed: i64 = self.run("DEL", cmd).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut cmd = redis::cmd("EXISTS");
        cmd.arg(key);
        self.run("EXISTS", cmd).await
    }
}
