//! Request identity.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Preserve an ID supplied by the client
//!
//! # Design Decisions
//! - The ID travels in the `x-request-id` header and is echoed on the
//!   response, so a waiter's long-held connection stays correlatable

use axum::http::Request;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Attaches a UUID v4 to requests that do not already carry an ID.
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(value))
    }
}
