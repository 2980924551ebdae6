//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the caching proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream endpoint the proxy fronts.
    pub upstream: UpstreamConfig,

    /// Cache expiration and pacing settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream endpoint configuration.
///
/// The cache key is appended to `url` as a `key` query parameter, so
/// `https://example.org/` becomes `https://example.org/?key=<key>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream endpoint.
    pub url: String,

    /// Per-attempt request timeout in seconds. A timed-out attempt is a
    /// transient failure and will be retried.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://vast-eyrie-4711.herokuapp.com/".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Cache expiration and pacing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long fetched content stays fresh, in seconds.
    pub content_ttl_secs: u64,

    /// How long a reservation (content-less entry) is honored before any
    /// other request may reclaim the key, in seconds.
    pub reservation_ttl_secs: u64,

    /// How long a waiter pauses before re-reading the store, in seconds.
    pub poll_interval_secs: u64,

    /// How long the fetcher pauses between upstream attempts after a
    /// transient failure, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            content_ttl_secs: 60 * 60 * 24,
            reservation_ttl_secs: 5 * 60,
            poll_interval_secs: 20,
            retry_backoff_ms: 1000,
        }
    }
}

impl CacheConfig {
    pub fn content_ttl(&self) -> Duration {
        Duration::from_secs(self.content_ttl_secs)
    }

    pub fn reservation_ttl(&self) -> Duration {
        Duration::from_secs(self.reservation_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = ProxyConfig::default();
        assert_eq!(config.cache.content_ttl_secs, 86_400);
        assert_eq!(config.cache.reservation_ttl_secs, 300);
        assert_eq!(config.cache.poll_interval_secs, 20);
        assert_eq!(config.cache.retry_backoff_ms, 1000);
        assert_eq!(config.upstream.request_timeout_secs, 10);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstream]
            url = "http://127.0.0.1:9000/"

            [cache]
            poll_interval_secs = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.url, "http://127.0.0.1:9000/");
        assert_eq!(config.upstream.request_timeout_secs, 10);
        assert_eq!(config.cache.poll_interval_secs, 1);
        assert_eq!(config.cache.content_ttl_secs, 86_400);
    }
}
