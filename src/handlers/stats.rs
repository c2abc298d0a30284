use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::protocol::MethodError;

/// Counts accepted TCP connections. Cloned into the gateway's connect hook
/// and into the `system.connections` method.
#[derive(Debug, Clone, Default)]
pub struct ConnectionCounter(Arc<AtomicU64>);

impl ConnectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, peer: SocketAddr) {
        let total = self.0.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!("Client connected from {peer} (total {total})");
    }

    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub time: String,
    pub uptime_secs: u64,
}

pub async fn info(started: Instant) -> Result<SystemInfo, MethodError> {
    Ok(SystemInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        time: chrono::Utc::now().to_rfc3339(),
        uptime_secs: started.elapsed().as_secs(),
    })
}
