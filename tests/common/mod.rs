//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use keyfront::cache::{Coordinator, MemoryStore};
use keyfront::config::ProxyConfig;
use keyfront::http::HttpServer;
use keyfront::lifecycle::Shutdown;
use keyfront::upstream::HttpFetcher;

/// Start a programmable mock upstream on an ephemeral port.
///
/// The closure decides the status and body for each incoming request.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = [0u8; 4096];
                        let mut head = Vec::new();
                        loop {
                            match socket.read(&mut buf).await {
                                Ok(0) => break,
                                Ok(n) => {
                                    head.extend_from_slice(&buf[..n]);
                                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                }
                                Err(_) => return,
                            }
                        }

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A proxy config tuned for fast tests, pointed at the given upstream.
pub fn test_config(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.url = format!("http://{}/", upstream);
    config.upstream.request_timeout_secs = 2;
    config.cache.content_ttl_secs = 60;
    config.cache.reservation_ttl_secs = 30;
    config.cache.poll_interval_secs = 1;
    config.cache.retry_backoff_ms = 200;
    config.observability.metrics_enabled = false;
    config
}

/// Wire up and spawn a full proxy. Keep the returned `Shutdown` alive for
/// the duration of the test; dropping it stops the server.
pub async fn spawn_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let store = Arc::new(MemoryStore::new());
    let fetcher = Arc::new(HttpFetcher::new(&config.upstream).unwrap());
    let coordinator = Arc::new(Coordinator::new(store, fetcher, config.cache.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(coordinator);

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}
