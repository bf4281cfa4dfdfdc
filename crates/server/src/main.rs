//! smartsearch server entry point.
//!
//! Boots the caching search proxy over HTTP. Logging is JSON on stderr.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use smartsearch_client::{GoogleClient, SearchProvider, UnconfiguredProvider};
use smartsearch_core::{AppConfig, CacheDb, CacheStore, NoopStore};
use tracing_subscriber::EnvFilter;

mod inflight;
mod rate_limit;
mod resolver;
mod router;
mod sweeper;

use rate_limit::{RateLimitConfig, create_rate_limiter};
use resolver::Resolver;
use router::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let mut sweep_task = None;
    let store: Arc<dyn CacheStore> = match CacheDb::connect(&config.database_url, config.cache_ttl()).await {
        Ok(db) => {
            tracing::info!(database_url = %config.database_url, ttl_secs = config.cache_ttl_secs, "cache store connected");
            sweep_task = Some(sweeper::spawn(db.clone(), config.sweep_interval()));
            Arc::new(db)
        }
        Err(e) => {
            tracing::error!(database_url = %config.database_url, error = %e, "cache store unavailable; serving without cache");
            Arc::new(NoopStore)
        }
    };

    let provider: Arc<dyn SearchProvider> = match GoogleClient::from_app_config(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "search provider not configured; cache misses will fail");
            Arc::new(UnconfiguredProvider)
        }
    };

    let resolver = Arc::new(Resolver::new(store, provider, config.timeout()));
    let mut prune_task = None;
    let limiter = config.rate_limit_enabled.then(|| {
        let limiter = create_rate_limiter(&RateLimitConfig::from_app_config(&config));
        prune_task = Some(rate_limit::spawn_pruner(Arc::clone(&limiter), config.rate_limit_window()));
        limiter
    });
    let app = build_router(AppState { resolver: Arc::clone(&resolver) }, limiter);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, rate_limited = config.rate_limit_enabled, "smartsearch listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    for task in [sweep_task, prune_task].into_iter().flatten() {
        task.abort();
    }
    tracing::info!(inflight = resolver.inflight().len(), "smartsearch stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
