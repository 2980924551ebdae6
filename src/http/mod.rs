//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, GET /from_cache handler)
//!     → request.rs (attach x-request-id)
//!     → [coordinator resolves the key]
//!     → response.rs (JSON re-serialization, error mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
