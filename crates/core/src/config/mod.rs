//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SMARTSEARCH_*)
//! 2. Legacy unprefixed variables (API_KEY, CX, PORT, DATABASE_URL)
//! 3. TOML config file (if SMARTSEARCH_CONFIG_FILE set)
//! 4. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Unprefixed variable names honoured for compatibility with existing deployments.
const LEGACY_ENV_KEYS: &[&str] = &["API_KEY", "CX", "PORT", "DATABASE_URL"];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SMARTSEARCH_*)
/// 2. Legacy unprefixed variables
/// 3. TOML config file (if SMARTSEARCH_CONFIG_FILE set)
/// 4. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database location, or `:memory:`.
    ///
    /// Set via SMARTSEARCH_DATABASE_URL or DATABASE_URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Google Custom Search API key.
    ///
    /// Set via SMARTSEARCH_API_KEY or API_KEY. Required only on a cache miss.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Google Custom Search engine id.
    ///
    /// Set via SMARTSEARCH_CX or CX. Required only on a cache miss.
    #[serde(default)]
    pub cx: Option<String>,

    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    ///
    /// Set via SMARTSEARCH_PORT or PORT.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upstream search endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Cache entry lifetime in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Interval between expired-entry sweeps in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Whether the per-client admission gate is installed.
    #[serde(default = "default_true")]
    pub rate_limit_enabled: bool,

    /// Requests admitted per client per window.
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,

    /// Admission window in seconds.
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
}

fn default_database_url() -> String {
    "./smartsearch-cache.sqlite".into()
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_base_url() -> String {
    "https://www.googleapis.com/customsearch/v1".into()
}

fn default_user_agent() -> String {
    "smartsearch/0.1".into()
}

fn default_timeout_ms() -> u64 {
    8_000
}

/// Longest accepted cache TTL, 100 years.
pub const MAX_CACHE_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

fn default_cache_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_rate_limit_max_requests() -> u32 {
    10
}

fn default_rate_limit_window_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            api_key: None,
            cx: None,
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            rate_limit_enabled: true,
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as a chrono duration, clamped to `MAX_CACHE_TTL_SECS`.
    pub fn cache_ttl(&self) -> chrono::Duration {
        let secs = self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::days(100 * 365))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SMARTSEARCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment
            .merge(Env::raw().only(LEGACY_ENV_KEYS).map(|key| key.as_str().to_lowercase().into()))
            .merge(
                Env::prefixed("SMARTSEARCH_")
                    .ignore(&["CONFIG_FILE"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Return both provider credentials, or why they are unusable.
    ///
    /// Blank values count as missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first absent credential.
    pub fn require_provider_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let api_key = non_blank(self.api_key.as_deref()).ok_or_else(|| ConfigError::Missing {
            field: "api_key".into(),
            hint: "Set SMARTSEARCH_API_KEY or API_KEY environment variable".into(),
        })?;
        let cx = non_blank(self.cx.as_deref()).ok_or_else(|| ConfigError::Missing {
            field: "cx".into(),
            hint: "Set SMARTSEARCH_CX or CX environment variable".into(),
        })?;
        Ok((api_key, cx))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
