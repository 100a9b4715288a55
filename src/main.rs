//! Cache Facade smoke runner
//!
//! Connects to the configured Redis server and exercises every cache operation
//! once against a sample `User` value, logging each outcome.
//!
//! Usage: `cache_facade [settings.json]`. Without a settings file the
//! configuration comes from environment variables.

use std::convert::Infallible;

use anyhow::Context;
use chrono::{Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_facade::{Cache, CacheError, Config, Expiry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from a settings file or environment variables
/// 3. Connect the cache to Redis
/// 4. Run the smoke sequence
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_facade=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_json_file(&path)
            .with_context(|| format!("loading settings from {path}"))?,
        None => Config::from_env(),
    };
    info!(
        prefix = config.prefix.as_deref().unwrap_or(""),
        timeout = ?config.operation_timeout,
        "Configuration loaded"
    );

    let cache = Cache::connect(&config)
        .await
        .context("connecting to Redis")?;

    run_smoke(&cache).await?;

    info!("Smoke run complete");
    Ok(())
}

/// Runs add, get, set, get, remove, try_get and get-or-acquire on the `user` key.
async fn run_smoke(cache: &Cache) -> anyhow::Result<()> {
    // Local time on purpose: the facade normalizes it to UTC
    let expiry = Expiry::from(Local::now() + Duration::minutes(2));
    let first = User {
        id: 1,
        name: "tyzshare".to_string(),
    };
    let second = User {
        id: 2,
        name: "tyzshare2".to_string(),
    };

    match cache.add("user", &first, expiry).await {
        Ok(()) => info!(?first, "add: stored"),
        // A previous run within the expiry window leaves the entry behind
        Err(CacheError::AlreadyExists(key)) => warn!(key = %key, "add: live entry already present"),
        Err(err) => return Err(err).context("add"),
    }

    let current: Option<User> = cache.get("user").await.context("get")?;
    info!(?current, "get");

    cache.set("user", &second, expiry).await.context("set")?;
    let current: User = cache.get("user").await.context("get after set")?;
    info!(?current, "set: overwritten");

    cache.remove("user").await.context("remove")?;
    let after_remove: Option<User> = cache.try_get("user").await.context("try_get")?;
    info!(found = after_remove.is_some(), "try_get after remove");

    let acquired = cache
        .get_or_acquire(
            "user",
            || async { Ok::<_, Infallible>(first.clone()) },
            expiry,
            false,
        )
        .await
        .context("get_or_acquire")?;
    info!(?acquired, "get_or_acquire: populated on miss");

    cache.remove("user").await.context("cleanup")?;
    Ok(())
}
