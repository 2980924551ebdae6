//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Apply the configured default level
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber. Call once at startup.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("keyfront={default_level},tower_http=info")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
