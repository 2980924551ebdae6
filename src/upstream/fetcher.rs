//! Upstream HTTP fetcher.
//!
//! # Responsibilities
//! - Perform exactly one GET per attempt against the configured endpoint
//! - Enforce the per-attempt request timeout
//! - Classify failures as transient (retryable) or permanent
//!
//! # Design Decisions
//! - Retry policy lives in the coordinator, not here
//! - Connection errors and timeouts are always transient; 5xx and 429
//!   are transient; remaining 4xx mean the key itself is bad

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// Outcome of a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetcher could not be constructed from its configuration.
    #[error("invalid upstream configuration: {0}")]
    Config(String),

    /// Network error, timeout, or a retryable upstream status. The
    /// coordinator retries these at a fixed interval.
    #[error("transient upstream failure: {0}")]
    Transient(String),

    /// The upstream explicitly rejected the key. Terminal for the
    /// current generation.
    #[error("upstream rejected key with status {0}")]
    Permanent(StatusCode),
}

/// One fetch attempt for a key. The coordinator owns all retry logic.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Bytes, FetchError>;
}

/// Fetcher issuing one GET per attempt against the configured endpoint,
/// with the key interpolated as a query parameter.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let url: Url = config.url.parse().map_err(|e| {
            FetchError::Config(format!("invalid upstream URL '{}': {}", config.url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self { client, url })
    }

    fn request_url(&self, key: &str) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("key", key);
        url
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, key: &str) -> Result<Bytes, FetchError> {
        let url = self.request_url(key);

        // Send errors cover connect failures and the per-attempt timeout.
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Err(FetchError::Transient(e.to_string())),
        };

        let status = response.status();
        if status.is_success() {
            return response
                .bytes()
                .await
                .map_err(|e| FetchError::Transient(e.to_string()));
        }

        if retryable_status(status) {
            Err(FetchError::Transient(format!("upstream returned {status}")))
        } else {
            Err(FetchError::Permanent(status))
        }
    }
}

/// 5xx and 429 are worth retrying; other non-2xx statuses signal the
/// upstream does not know the key.
fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_appended_as_query_parameter() {
        let fetcher = HttpFetcher::new(&UpstreamConfig {
            url: "https://example.org/".into(),
            request_timeout_secs: 10,
        })
        .unwrap();

        let url = fetcher.request_url("abc def");
        assert_eq!(url.as_str(), "https://example.org/?key=abc+def");
    }

    #[test]
    fn server_errors_and_429_are_retryable() {
        assert!(retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(retryable_status(StatusCode::BAD_GATEWAY));
        assert!(retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!retryable_status(StatusCode::NOT_FOUND));
        assert!(!retryable_status(StatusCode::FORBIDDEN));
    }

    #[test]
    fn invalid_url_is_a_config_error() {
        let err = HttpFetcher::new(&UpstreamConfig {
            url: "://broken".into(),
            request_timeout_secs: 10,
        })
        .unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }
}
