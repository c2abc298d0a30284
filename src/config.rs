use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default listening port.
const DEFAULT_PORT: u16 = 3000;

/// Default request body limit (1 MiB).
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid IP address, got `{value}`")]
    InvalidHost { var: &'static str, value: String },
    #[error("{var} must be an integer between {min} and {max}, got `{value}`")]
    InvalidNumber {
        var: &'static str,
        value: String,
        min: u64,
        max: u64,
    },
}

/// Gateway configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origins echoed back in `Access-Control-Allow-Origin`.
    pub allowed_origins: Vec<String>,
    /// HTML file served at `/` and at `/<file name>`.
    pub static_file: Option<PathBuf>,
    /// Sandbox root for the `files.*` demo methods.
    pub files_root: PathBuf,
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
            static_file: None,
            files_root: PathBuf::from("data"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    ///
    /// - `RPC_GATEWAY_HOST` (optional, default 127.0.0.1)
    /// - `RPC_GATEWAY_PORT` (optional, default 3000)
    /// - `RPC_GATEWAY_ALLOWED_ORIGINS` (optional): comma-separated CORS allow-list
    /// - `RPC_GATEWAY_STATIC_FILE` (optional): HTML file served at `/`
    /// - `RPC_GATEWAY_FILES_ROOT` (optional, default `data`): root for file methods
    /// - `RPC_GATEWAY_MAX_BODY_BYTES` (optional, default 1 MiB)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("RPC_GATEWAY_HOST") {
            config.host = value.trim().parse().map_err(|_| ConfigError::InvalidHost {
                var: "RPC_GATEWAY_HOST",
                value,
            })?;
        }

        if let Some(value) = lookup("RPC_GATEWAY_PORT") {
            config.port = parse_number("RPC_GATEWAY_PORT", &value, 0, u16::MAX as u64)? as u16;
        }

        if let Some(value) = lookup("RPC_GATEWAY_ALLOWED_ORIGINS") {
            config.allowed_origins = split_list(&value);
        }

        if let Some(value) = lookup("RPC_GATEWAY_STATIC_FILE").filter(|v| !v.trim().is_empty()) {
            config.static_file = Some(PathBuf::from(value.trim()));
        }

        if let Some(value) = lookup("RPC_GATEWAY_FILES_ROOT").filter(|v| !v.trim().is_empty()) {
            config.files_root = PathBuf::from(value.trim());
        }

        if let Some(value) = lookup("RPC_GATEWAY_MAX_BODY_BYTES") {
            config.max_body_bytes =
                parse_number("RPC_GATEWAY_MAX_BODY_BYTES", &value, 1, u32::MAX as u64)? as usize;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// File name under which the static file is also reachable, e.g. `/index.html`.
    pub fn static_file_name(&self) -> Option<String> {
        self.static_file
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

fn parse_number(var: &'static str, value: &str, min: u64, max: u64) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|n| (min..=max).contains(n))
        .ok_or_else(|| ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
            min,
            max,
        })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
