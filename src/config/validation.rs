//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (TTLs and intervals > 0)
//! - Check addresses and the upstream URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidUpstreamUrl(String),
    ZeroDuration(&'static str),
    ReservationExceedsContentTtl,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "invalid bind address '{}'", addr)
            }
            ValidationError::InvalidUpstreamUrl(url) => {
                write!(f, "invalid upstream URL '{}'", url)
            }
            ValidationError::ZeroDuration(field) => {
                write!(f, "'{}' must be greater than zero", field)
            }
            ValidationError::ReservationExceedsContentTtl => {
                write!(f, "reservation_ttl_secs must not exceed content_ttl_secs")
            }
        }
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::InvalidUpstreamUrl(
            config.upstream.url.clone(),
        ));
    }

    for (value, field) in [
        (config.upstream.request_timeout_secs, "request_timeout_secs"),
        (config.cache.content_ttl_secs, "content_ttl_secs"),
        (config.cache.reservation_ttl_secs, "reservation_ttl_secs"),
        (config.cache.poll_interval_secs, "poll_interval_secs"),
        (config.cache.retry_backoff_ms, "retry_backoff_ms"),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration(field));
        }
    }

    // A reservation outliving the content it guards would let a dead
    // fetcher block the key longer than the content itself is trusted.
    if config.cache.reservation_ttl_secs > config.cache.content_ttl_secs {
        errors.push(ValidationError::ReservationExceedsContentTtl);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
