//! Expiration and recovery behavior over real HTTP.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn fresh_content_is_served_without_a_second_fetch() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = common::start_programmable_upstream(move || {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (200, "{\"v\":1}".into())
        }
    })
    .await;

    let (proxy, _shutdown) = common::spawn_proxy(common::test_config(upstream)).await;
    let client = client();
    let url = format!("http://{}/from_cache?key=abc", proxy);

    for _ in 0..3 {
        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_content_triggers_a_refetch() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = common::start_programmable_upstream(move || {
        let cc = cc.clone();
        async move {
            let n = cc.fetch_add(1, Ordering::SeqCst);
            (200, format!("{{\"gen\":{}}}", n))
        }
    })
    .await;

    let mut config = common::test_config(upstream);
    config.cache.content_ttl_secs = 1;
    config.cache.reservation_ttl_secs = 1;
    let (proxy, _shutdown) = common::spawn_proxy(config).await;
    let client = client();
    let url = format!("http://{}/from_cache?key=abc", proxy);

    let first: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(first, serde_json::json!({"gen": 0}));

    tokio::time::sleep(Duration::from_millis(1300)).await;

    let second: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(second, serde_json::json!({"gen": 1}));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn triggered_shutdown_stops_the_listener() {
    let upstream = common::start_programmable_upstream(|| async { (200, "{}".into()) }).await;
    let (proxy, shutdown) = common::spawn_proxy(common::test_config(upstream)).await;
    let client = client();
    let url = format!("http://{}/from_cache?key=abc", proxy);

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(client.get(&url).send().await.is_err());
}

#[tokio::test]
async fn abandoned_bad_key_reservation_is_reclaimed() {
    // First request hits a 404 and fails; its reservation is left in
    // place. Once that reservation expires, the next request takes over
    // and succeeds against the recovered upstream.
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = common::start_programmable_upstream(move || {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) == 0 {
                (404, "no such key".into())
            } else {
                (200, "{\"v\":1}".into())
            }
        }
    })
    .await;

    let mut config = common::test_config(upstream);
    config.cache.reservation_ttl_secs = 2;
    let (proxy, _shutdown) = common::spawn_proxy(config).await;
    let client = client();
    let url = format!("http://{}/from_cache?key=abc", proxy);

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::BAD_GATEWAY);

    // Arrives while the dead reservation is still live, waits it out,
    // then becomes the new fetcher.
    let second = client.get(&url).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"v": 1}));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
