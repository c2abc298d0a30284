//! End-to-end tests against a gateway bound to a real socket.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use rpc_gateway::config::GatewayConfig;
use rpc_gateway::handlers::{self, stats::ConnectionCounter};
use rpc_gateway::server::Gateway;

/// Start a gateway on an ephemeral port. Dropping the returned sender shuts
/// it down.
async fn start(gateway: Gateway) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        gateway
            .serve_with_shutdown(listener, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
    });

    (addr, tx)
}

#[tokio::test]
async fn connect_hook_runs_once_per_connection() {
    let tmp = tempfile::tempdir().unwrap();
    let config = GatewayConfig {
        files_root: tmp.path().to_path_buf(),
        ..GatewayConfig::default()
    };
    let counter = ConnectionCounter::new();
    let registry = handlers::demo_registry(&config, counter.clone()).unwrap();
    let hook_counter = counter.clone();
    let gateway = Gateway::new(config, registry).on_connect(move |peer| hook_counter.record(peer));
    let (addr, _shutdown) = start(gateway).await;

    // Separate clients never share pooled connections.
    for _ in 0..3 {
        let response = Client::new()
            .get(format!("http://{addr}/rpc/methods"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let response = Client::new()
        .post(format!("http://{addr}/rpc"))
        .json(&json!({"method": "system.connections", "args": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"result": 4}));
    assert_eq!(counter.count(), 4);
}

#[tokio::test]
async fn keep_alive_connection_counts_once() {
    let connects = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&connects);
    let gateway = Gateway::new(
        GatewayConfig::default(),
        rpc_gateway::registry::MethodRegistry::empty(),
    )
    .on_connect(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let (addr, _shutdown) = start(gateway).await;

    let client = Client::new();
    for _ in 0..3 {
        let response = client
            .get(format!("http://{addr}/rpc/methods"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"methods": []}));
    }

    assert_eq!(connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_method_over_the_wire() {
    let gateway = Gateway::new(
        GatewayConfig::default(),
        rpc_gateway::registry::MethodRegistry::empty(),
    );
    let (addr, _shutdown) = start(gateway).await;

    let response = Client::new()
        .post(format!("http://{addr}/rpc"))
        .json(&json!({"method": "missing", "args": [1]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "unknown method"}));
}
