use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, FromRequest, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::serve::Listener;
use axum::{Json, Router};
use tokio::net::{TcpListener, TcpStream};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::protocol::{MethodError, RpcRequest, RpcResponse};
use crate::registry::MethodRegistry;

/// Callback run for every accepted TCP connection.
pub type ConnectHook = Arc<dyn Fn(SocketAddr) + Send + Sync>;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
struct AppState {
    registry: Arc<MethodRegistry>,
    config: Arc<GatewayConfig>,
}

/// HTTP front end for a [`MethodRegistry`].
///
/// Routes:
/// - `GET /` and `GET /<static file name>`: configured HTML file
/// - `GET /rpc/methods`: discovery document
/// - `POST /rpc`: `{method, args}` dispatch
/// - `OPTIONS *`: CORS preflight against the origin allow-list
///
/// Anything else answers `404 Not found`.
pub struct Gateway {
    config: Arc<GatewayConfig>,
    registry: Arc<MethodRegistry>,
    on_connect: Option<ConnectHook>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, registry: impl Into<Arc<MethodRegistry>>) -> Self {
        Self {
            config: Arc::new(config),
            registry: registry.into(),
            on_connect: None,
        }
    }

    /// Run `hook` with the peer address of every accepted connection.
    pub fn on_connect<F>(mut self, hook: F) -> Self
    where
        F: Fn(SocketAddr) + Send + Sync + 'static,
    {
        self.on_connect = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    /// Build the axum router. Exposed so callers can embed the gateway or
    /// drive it without a socket.
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
        };

        let mut router = Router::new()
            .route("/rpc", post(handle_rpc).fallback(not_found))
            .route("/rpc/methods", get_only(handle_methods));

        if self.config.static_file.is_some() {
            router = router.route("/", get_only(handle_static));

            match self.config.static_file_name() {
                Some(name) if is_routable_file_name(&name) => {
                    router = router.route(&format!("/{name}"), get_only(handle_static));
                }
                Some(name) => warn!("Static file `{name}` is only served at /"),
                None => {}
            }
        }

        router
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(state.clone(), cors))
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> io::Result<TcpListener> {
        TcpListener::bind(self.config.socket_addr()).await
    }

    /// Serve on `listener` until the process ends.
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Serve on `listener` until `signal` completes, then drain open connections.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let local_addr = listener.local_addr()?;
        info!(
            "RPC gateway listening on {local_addr} ({} methods)",
            self.registry.len()
        );

        let listener = HookedListener {
            inner: listener,
            hook: self.on_connect,
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
    }
}

/// `TcpListener` that reports each accepted connection to a [`ConnectHook`].
struct HookedListener {
    inner: TcpListener,
    hook: Option<ConnectHook>,
}

impl Listener for HookedListener {
    type Io = TcpStream;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        let (stream, addr) = Listener::accept(&mut self.inner).await;
        if let Some(hook) = &self.hook {
            hook(addr);
        }
        (stream, addr)
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        Listener::local_addr(&self.inner)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_rpc(State(state): State<AppState>, request: Request) -> Response {
    // Content type is checked before the body is read, so the size limit
    // only applies to JSON bodies.
    if !is_json(request.headers()) {
        return bad_request("Content-Type must be application/json");
    }

    let body = match Bytes::from_request(request, &state).await {
        Ok(body) => body,
        Err(rejection) => return rejection.into_response(),
    };

    let request = match RpcRequest::from_slice(&body) {
        Ok(r) => r,
        Err(reason) => {
            debug!("Rejected RPC body: {reason}");
            return bad_request(reason);
        }
    };

    debug!(method = %request.method, args = request.args.len(), "Dispatching RPC call");

    match state.registry.invoke(&request.method, request.args).await {
        Ok(result) => (StatusCode::OK, Json(RpcResponse::success(result))).into_response(),
        Err(err) => {
            match &err {
                MethodError::Failed(message) => {
                    warn!(method = %request.method, "RPC call failed: {message}")
                }
                other => debug!(method = %request.method, "RPC call rejected: {other}"),
            }
            (err.status(), Json(RpcResponse::from(&err))).into_response()
        }
    }
}

async fn handle_methods(State(state): State<AppState>) -> Response {
    (
        [(CONTENT_TYPE, JSON_CONTENT_TYPE)],
        state.registry.discovery().to_string(),
    )
        .into_response()
}

async fn handle_static(State(state): State<AppState>) -> Response {
    let Some(path) = state.config.static_file.as_ref() else {
        return not_found().await;
    };

    match tokio::fs::read(path).await {
        Ok(contents) => ([(CONTENT_TYPE, HTML_CONTENT_TYPE)], contents).into_response(),
        Err(e) => {
            warn!("Cannot read static file {}: {e}", path.display());
            not_found().await
        }
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// GET route that answers `HEAD` and every other method with not-found.
fn get_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: axum::handler::Handler<T, AppState>,
    T: 'static,
{
    get(handler).head(not_found).fallback(not_found)
}

/// Answers preflight requests and stamps the allow-origin header on every
/// other response. A missing or unlisted origin gets an empty value.
async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allow_origin = allowed_origin(&state.config, request.headers());

    if request.method() == Method::OPTIONS {
        return (
            StatusCode::NO_CONTENT,
            [
                (ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin),
                (
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOWED_METHODS),
                ),
                (
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOWED_HEADERS),
                ),
                (VARY, HeaderValue::from_static("Origin")),
            ],
        )
            .into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(VARY, HeaderValue::from_static("Origin"));
    response
}

fn allowed_origin(config: &GatewayConfig, headers: &HeaderMap) -> HeaderValue {
    headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|origin| config.is_origin_allowed(origin))
        .and_then(|origin| HeaderValue::from_str(origin).ok())
        .unwrap_or_else(|| HeaderValue::from_static(""))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
        .unwrap_or(false)
}

fn bad_request(reason: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, reason.into()).into_response()
}

/// Names that would collide with the RPC routes or with axum's path syntax
/// are not given their own route.
fn is_routable_file_name(name: &str) -> bool {
    !name.is_empty() && name != "rpc" && !name.contains(['{', '}', '*', ':', '/'])
}
