use rpc_gateway::schema::{validate_json, SchemaValidationError};

const ERROR_BODY_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["error"],
  "additionalProperties": false,
  "properties": {
    "error": { "type": "string", "minLength": 1 }
  }
}"#;

#[test]
fn json_schema_harness_validates_instance() {
    validate_json(ERROR_BODY_SCHEMA, r#"{"error": "unknown method"}"#)
        .expect("schema validation failed");
}

#[test]
fn json_schema_harness_reports_violation() {
    let err = validate_json(ERROR_BODY_SCHEMA, r#"{"error": ""}"#).unwrap_err();
    assert!(matches!(err, SchemaValidationError::ValidationFailed(_)));
}

#[test]
fn json_schema_harness_reports_unparsable_instance() {
    let err = validate_json(ERROR_BODY_SCHEMA, "{not json").unwrap_err();
    assert!(matches!(err, SchemaValidationError::SchemaParse(_)));
}
