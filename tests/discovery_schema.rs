use serde_json::{json, Value};

use rpc_gateway::config::GatewayConfig;
use rpc_gateway::handlers::{self, stats::ConnectionCounter};
use rpc_gateway::protocol::{MethodError, RpcResponse};
use rpc_gateway::registry::{MethodRegistry, MethodSpec};
use rpc_gateway::schema::{validate_json, validate_value, DISCOVERY_SCHEMA, RPC_RESPONSE_SCHEMA};

async fn greet(name: String) -> Result<String, MethodError> {
    Ok(format!("hello {name}"))
}

#[test]
fn golden_discovery_document() {
    let registry = MethodRegistry::builder()
        .method(
            MethodSpec::new("greet")
                .param("name", "string")
                .returns("string")
                .description("Say hello"),
            greet,
        )
        .method(MethodSpec::new("bare").param_untyped("x"), greet)
        .build()
        .unwrap();

    let document = registry.discovery();

    // 1. Schema
    validate_json(DISCOVERY_SCHEMA, document).expect("discovery document must satisfy schema");

    // 2. Golden snapshot (byte-identical, sorted by name)
    let expected = concat!(
        r#"{"methods":["#,
        r#"{"name":"bare","type":"function","params":[{"name":"x"}]},"#,
        r#"{"name":"greet","type":"function","params":[{"name":"name","type":"string"}],"returnType":"string","description":"Say hello"}"#,
        r#"]}"#
    );
    assert_eq!(document, expected, "discovery JSON snapshot mismatch");
}

#[test]
fn demo_registry_discovery_satisfies_schema() {
    let tmp = tempfile::tempdir().unwrap();
    let config = GatewayConfig {
        files_root: tmp.path().to_path_buf(),
        ..GatewayConfig::default()
    };
    let registry = handlers::demo_registry(&config, ConnectionCounter::new()).unwrap();

    validate_json(DISCOVERY_SCHEMA, registry.discovery()).expect("demo discovery must satisfy schema");
}

#[test]
fn rpc_responses_satisfy_schema() {
    let success = serde_json::to_value(RpcResponse::success(json!({"nested": [1, 2]}))).unwrap();
    let null_success = serde_json::to_value(RpcResponse::success(Value::Null)).unwrap();
    let failure = serde_json::to_value(RpcResponse::from(&MethodError::UnknownMethod("x".into()))).unwrap();

    for value in [&success, &null_success, &failure] {
        validate_value(RPC_RESPONSE_SCHEMA, value).expect("response must satisfy schema");
    }

    assert_eq!(null_success, json!({"result": null}));
    assert_eq!(failure, json!({"error": "unknown method"}));
}

#[test]
fn schema_rejects_response_with_both_fields() {
    let both = json!({"result": 1, "error": "boom"});
    assert!(validate_value(RPC_RESPONSE_SCHEMA, &both).is_err());
}
