use serde::Deserialize;
use serde_json::Value;

/// Body of a `POST /rpc` call.
///
/// `args` are spread positionally into the target method. An absent `args`
/// field is treated as an empty argument list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl RpcRequest {
    /// Parse a raw request body.
    ///
    /// Returns the reason as a short string on failure; the gateway reports it
    /// as a plain-text `400`.
    pub fn from_slice(body: &[u8]) -> Result<Self, String> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| format!("Invalid JSON body: {e}"))?;

        if !value.is_object() {
            return Err("Request body must be a JSON object".into());
        }

        serde_json::from_value(value).map_err(|e| format!("Invalid RPC request: {e}"))
    }
}
