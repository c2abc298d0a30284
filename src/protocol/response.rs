use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Message returned to clients when the requested method is not registered.
pub const UNKNOWN_METHOD_MESSAGE: &str = "unknown method";

// ---------------------------------------------------------------------------
// RPC response envelope
// ---------------------------------------------------------------------------

/// Body of a `POST /rpc` response. Exactly one of `result` or `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RpcResponse {
    Success { result: Value },
    Failure { error: String },
}

impl RpcResponse {
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }
}

impl From<&MethodError> for RpcResponse {
    fn from(err: &MethodError) -> Self {
        Self::failure(err.client_message())
    }
}

// ---------------------------------------------------------------------------
// Method error taxonomy
// ---------------------------------------------------------------------------

/// Failure of a single RPC invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MethodError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Failed(String),
}

impl MethodError {
    /// Shorthand for a handler-raised failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn invalid_arguments(detail: impl Into<String>) -> Self {
        Self::InvalidArguments(detail.into())
    }

    /// HTTP status the gateway answers with.
    ///
    /// Unknown method → 404
    /// Argument decoding failure → 400
    /// Handler failure → 500
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownMethod(_) => StatusCode::NOT_FOUND,
            Self::InvalidArguments(_) => StatusCode::BAD_REQUEST,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `{error}` body. The method name is not echoed back
    /// for unknown methods.
    pub fn client_message(&self) -> String {
        match self {
            Self::UnknownMethod(_) => UNKNOWN_METHOD_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery layer (`GET /rpc/methods`)
// ---------------------------------------------------------------------------

/// One positional parameter of a registered method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

/// Discovery metadata for one registered method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Always `"function"`; every registry entry is callable.
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub params: Vec<ParamDescriptor>,
    #[serde(rename = "returnType", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of a `GET /rpc/methods` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodsResponse {
    pub methods: Vec<MethodDescriptor>,
}
