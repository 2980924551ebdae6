//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the cache endpoint
//! - Wire up middleware (tracing, request ID)
//! - Dispatch requests to the coordinator
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - No overall request timeout on `/from_cache`: a waiter legitimately
//!   holds its connection across multiple poll intervals
//! - Client disconnects simply drop the handler future; the coordinator's
//!   fetch task is detached and unaffected

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::cache::Coordinator;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::{error_response, serve_json};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

/// HTTP server for the caching proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around an already-wired coordinator.
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        let state = AppState { coordinator };
        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/from_cache", get(from_cache_handler))
            .route("/from_cache/", get(from_cache_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Stops when the shutdown signal fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown trigger received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Deserialize)]
struct FromCacheParams {
    key: Option<String>,
}

/// `GET /from_cache?key=<string>` — the single inbound endpoint.
async fn from_cache_handler(
    State(state): State<AppState>,
    Query(params): Query<FromCacheParams>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let key = params.key.unwrap_or_default();
    tracing::debug!(request_id = %request_id, key = %key, "Cache request received");

    let response = match state.coordinator.handle(&key, &request_id).await {
        Ok(body) => serve_json(&body),
        Err(err) => {
            tracing::warn!(request_id = %request_id, key = %key, error = %err, "Request failed");
            error_response(err)
        }
    };

    metrics::record_request_duration(start);
    response
}
