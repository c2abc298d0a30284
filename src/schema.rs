//! JSON Schemas for the gateway's wire documents, and a validation helper.

use jsonschema::validator_for;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("Instance validation failed: {0}")]
    ValidationFailed(String),
}

/// Schema of the `GET /rpc/methods` body (draft 2020-12).
pub const DISCOVERY_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "RPC discovery document",
  "type": "object",
  "required": ["methods"],
  "additionalProperties": false,
  "properties": {
    "methods": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["name", "type", "params"],
        "additionalProperties": false,
        "properties": {
          "name": { "type": "string", "minLength": 1 },
          "type": { "const": "function" },
          "params": {
            "type": "array",
            "items": {
              "type": "object",
              "required": ["name"],
              "additionalProperties": false,
              "properties": {
                "name": { "type": "string" },
                "type": { "type": "string" }
              }
            }
          },
          "returnType": { "type": "string" },
          "description": { "type": "string" }
        }
      }
    }
  }
}"#;

/// Schema of every JSON `POST /rpc` body: exactly one of `result` or `error`.
pub const RPC_RESPONSE_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "RPC response",
  "oneOf": [
    {
      "type": "object",
      "required": ["result"],
      "additionalProperties": false,
      "properties": { "result": true }
    },
    {
      "type": "object",
      "required": ["error"],
      "additionalProperties": false,
      "properties": { "error": { "type": "string" } }
    }
  ]
}"#;

/// Validate an already-parsed instance against a schema given as text.
pub fn validate_value(schema_str: &str, instance: &Value) -> Result<(), SchemaValidationError> {
    let schema_json: Value = serde_json::from_str(schema_str)?;

    let validator = validator_for(&schema_json)
        .map_err(|e| SchemaValidationError::SchemaCompile(e.to_string()))?;

    let first = validator.iter_errors(instance).next().map(|e| e.to_string());
    match first {
        None => Ok(()),
        Some(err) => Err(SchemaValidationError::ValidationFailed(err)),
    }
}

/// Validate a JSON document given as text.
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaValidationError> {
    let instance: Value = serde_json::from_str(instance_str)?;
    validate_value(schema_str, &instance)
}
