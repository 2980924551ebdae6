//! Read-through caching proxy for a single keyed upstream endpoint.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use cache::{CacheError, Coordinator, MemoryStore};
pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
