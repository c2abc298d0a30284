//! Minimal RPC gateway.
//!
//! Exposes a fixed [`MethodRegistry`](registry::MethodRegistry) of named async
//! functions over HTTP: `POST /rpc` dispatches `{method, args}` bodies,
//! `GET /rpc/methods` describes the registered methods, `OPTIONS` answers CORS
//! preflight against an origin allow-list and `/` can serve a static HTML page.
//!
//! ```no_run
//! use rpc_gateway::config::GatewayConfig;
//! use rpc_gateway::protocol::MethodError;
//! use rpc_gateway::registry::{MethodRegistry, MethodSpec};
//! use rpc_gateway::server::Gateway;
//!
//! async fn add(a: i64, b: i64) -> Result<i64, MethodError> {
//!     Ok(a + b)
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = MethodRegistry::builder()
//!     .method(MethodSpec::new("add").param("a", "number").param("b", "number"), add)
//!     .build()?;
//!
//! let gateway = Gateway::new(GatewayConfig::default(), registry);
//! let listener = gateway.bind().await?;
//! gateway.serve(listener).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod server;

pub mod schema;
