//! Response shaping and error mapping.
//!
//! # Responsibilities
//! - Re-serialize cached payloads as JSON for the client
//! - Map terminal cache errors to HTTP statuses
//!
//! # Design Decisions
//! - Bodies pass through `serde_json::Value`, so output is valid JSON
//!   but not necessarily byte-identical to the upstream payload
//! - Transient failures never reach this layer; only terminal outcomes do

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::cache::CacheError;

/// Serve a cached body as `application/json`.
pub fn serve_json(body: &[u8]) -> Response {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Cached content is not valid JSON");
            (StatusCode::BAD_GATEWAY, "Upstream returned invalid JSON").into_response()
        }
    }
}

/// Map terminal cache errors onto client-facing statuses.
pub fn error_response(err: CacheError) -> Response {
    match err {
        CacheError::InvalidKey => (
            StatusCode::BAD_REQUEST,
            "Missing or empty 'key' parameter",
        )
            .into_response(),
        CacheError::UpstreamUnavailable => (
            StatusCode::BAD_GATEWAY,
            "Upstream unavailable for this key",
        )
            .into_response(),
        CacheError::Store(e) => {
            tracing::error!(error = %e, "Cache store failure");
            (StatusCode::BAD_GATEWAY, "Cache store unavailable").into_response()
        }
    }
}
