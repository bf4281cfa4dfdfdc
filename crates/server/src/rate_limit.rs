//! Per-client admission control using governor.
//!
//! Sits in front of the router; requests over quota never reach the resolver.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
};
use smartsearch_core::AppConfig;
use tokio::task::JoinHandle;

/// Body returned when a client exceeds its quota.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please slow down.";

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum number of requests per window
    pub max_requests: u32,
    /// Window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 10, window: Duration::from_secs(30) }
    }
}

impl RateLimitConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self { max_requests: config.rate_limit_max_requests, window: config.rate_limit_window() }
    }
}

/// Limiter keyed by client IP, shared across requests.
pub type SharedRateLimiter = Arc<RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>>;

/// Build a limiter admitting `max_requests` per `window` per client.
///
/// The full quota is available as a burst and replenishes evenly over the
/// window. Zero values are clamped to one.
pub fn create_rate_limiter(config: &RateLimitConfig) -> SharedRateLimiter {
    let max = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
    let replenish = (config.window / max.get()).max(Duration::from_millis(1));
    let quota = Quota::with_period(replenish)
        .unwrap_or_else(|| Quota::per_second(max))
        .allow_burst(max);

    Arc::new(RateLimiter::keyed(quota))
}

/// Spawn a task that drops limiter state for idle clients every `interval`.
///
/// A client whose quota has fully replenished is indistinguishable from a new
/// one, so its entry can go.
pub fn spawn_pruner(limiter: SharedRateLimiter, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            limiter.retain_recent();
            limiter.shrink_to_fit();
            tracing::trace!(tracked_clients = limiter.len(), "pruned rate limiter state");
        }
    })
}

/// Client identity for limiting. Requests without connection info share one bucket.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rate limiting middleware
///
/// Returns HTTP 429 with a `retry-after` header when the client is over quota.
pub async fn rate_limit_middleware(State(limiter): State<SharedRateLimiter>, request: Request, next: Next) -> Response {
    let ip = client_ip(&request);
    match limiter.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(not_until) => {
            let retry_after = not_until.wait_time_from(DefaultClock::default().now()).as_secs().max(1);

            tracing::warn!(client = %ip, retry_after, "rate limit exceeded");

            (
                StatusCode::TOO_MANY_REQUESTS,
                [("retry-after", retry_after.to_string())],
                Json(serde_json::json!({ "error": RATE_LIMITED_MESSAGE })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.window, Duration::from_secs(30));
    }

    #[test]
    fn test_from_app_config() {
        let app = AppConfig { rate_limit_max_requests: 3, rate_limit_window_secs: 9, ..Default::default() };
        let config = RateLimitConfig::from_app_config(&app);
        assert_eq!(config.max_requests, 3);
        assert_eq!(config.window, Duration::from_secs(9));
    }

    #[test]
    fn test_limiter_allows_burst_then_rejects() {
        let limiter = create_rate_limiter(&RateLimitConfig { max_requests: 3, window: Duration::from_secs(30) });
        let client: IpAddr = "10.0.0.1".parse().unwrap();

        for _ in 0..3 {
            assert!(limiter.check_key(&client).is_ok());
        }
        assert!(limiter.check_key(&client).is_err());
    }

    fn flood(limiter: &SharedRateLimiter, clients: u32) {
        for i in 0..clients {
            let ip = IpAddr::V4(Ipv4Addr::from(0x0a00_0000 + i));
            let _ = limiter.check_key(&ip);
        }
    }

    #[tokio::test]
    async fn test_retain_recent_drops_idle_clients() {
        let limiter = create_rate_limiter(&RateLimitConfig { max_requests: 10, window: Duration::from_millis(30) });
        flood(&limiter, 5_000);
        assert_eq!(limiter.len(), 5_000);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let active: IpAddr = "192.168.1.1".parse().unwrap();
        assert!(limiter.check_key(&active).is_ok());

        limiter.retain_recent();
        assert_eq!(limiter.len(), 1);
    }

    #[tokio::test]
    async fn test_pruner_bounds_tracked_clients() {
        let limiter = create_rate_limiter(&RateLimitConfig { max_requests: 10, window: Duration::from_millis(30) });
        flood(&limiter, 5_000);

        let handle = spawn_pruner(Arc::clone(&limiter), Duration::from_millis(20));
        for _ in 0..100 {
            if limiter.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(limiter.is_empty());
    }

    #[test]
    fn test_limiter_keys_clients_separately() {
        let limiter = create_rate_limiter(&RateLimitConfig { max_requests: 1, window: Duration::from_secs(30) });
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check_key(&a).is_ok());
        assert!(limiter.check_key(&a).is_err());
        assert!(limiter.check_key(&b).is_ok());
    }
}
