//! keyfront — a read-through caching proxy.
//!
//! Sits in front of one slow, unreliable upstream endpoint keyed by an
//! opaque string and guarantees at most one in-flight upstream fetch per
//! key, no matter how many clients ask for it concurrently.
//!
//! # Request Flow
//!
//! ```text
//!  GET /from_cache?key=K
//!      │
//!      ▼
//!  ┌────────┐    ┌─────────────┐    fresh content ──▶ serve
//!  │  http  │───▶│ coordinator │──▶ entry absent  ──▶ reserve, fetch
//!  │ server │    │  (per key)  │    live reservation ▶ poll & re-check
//!  └────────┘    └──────┬──────┘    expired entry  ──▶ delete, re-reserve
//!                       │
//!            ┌──────────┴──────────┐
//!            ▼                     ▼
//!      ┌───────────┐         ┌───────────┐
//!      │  upstream │         │   cache   │
//!      │  fetcher  │         │   store   │
//!      └───────────┘         └───────────┘
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use keyfront::cache::{Coordinator, MemoryStore};
use keyfront::config::{load_config, ProxyConfig};
use keyfront::http::HttpServer;
use keyfront::lifecycle::Shutdown;
use keyfront::observability::{logging, metrics};
use keyfront::upstream::HttpFetcher;

#[derive(Parser)]
#[command(name = "keyfront")]
#[command(about = "Read-through caching proxy for a keyed upstream endpoint", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_url = %config.upstream.url,
        content_ttl_secs = config.cache.content_ttl_secs,
        reservation_ttl_secs = config.cache.reservation_ttl_secs,
        poll_interval_secs = config.cache.poll_interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Wire subsystems in dependency order: store, fetcher, coordinator.
    let store = Arc::new(MemoryStore::new());
    let fetcher = Arc::new(HttpFetcher::new(&config.upstream)?);
    let coordinator = Arc::new(Coordinator::new(store, fetcher, config.cache.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(coordinator);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
