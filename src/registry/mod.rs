//! Immutable mapping from method name to handler.

pub mod handler;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::OnceLock;

use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;

use crate::protocol::{MethodDescriptor, MethodError, MethodsResponse, ParamDescriptor};

pub use handler::{Handler, Invoke, MethodResult};
use handler::{RawHandler, TypedHandler};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("method `{0}` is registered more than once")]
    DuplicateMethod(String),
    #[error("method name must not be empty")]
    EmptyName,
}

/// Discovery metadata declared alongside a handler registration.
///
/// Declaring nothing but a name yields a name-only descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    name: String,
    params: Vec<ParamDescriptor>,
    return_type: Option<String>,
    description: Option<String>,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            description: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, param_type: impl Into<String>) -> Self {
        self.params.push(ParamDescriptor {
            name: name.into(),
            param_type: Some(param_type.into()),
        });
        self
    }

    pub fn param_untyped(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDescriptor {
            name: name.into(),
            param_type: None,
        });
        self
    }

    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn into_descriptor(self) -> MethodDescriptor {
        MethodDescriptor {
            name: self.name,
            kind: "function",
            params: self.params,
            return_type: self.return_type,
            description: self.description,
        }
    }
}

impl From<&str> for MethodSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

struct RegisteredMethod {
    descriptor: MethodDescriptor,
    handler: Box<dyn Invoke>,
}

/// Collects registrations before freezing them into a [`MethodRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<(MethodSpec, Box<dyn Invoke>)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed async function. Its positional arguments are decoded
    /// from the request's `args` array.
    pub fn method<H, T>(mut self, spec: impl Into<MethodSpec>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.entries
            .push((spec.into(), Box::new(TypedHandler::new(handler))));
        self
    }

    /// Register a variadic function receiving the raw `args` array.
    pub fn raw_method<F, Fut, R>(mut self, spec: impl Into<MethodSpec>, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, MethodError>> + Send + 'static,
        R: Serialize,
    {
        self.entries
            .push((spec.into(), Box::new(RawHandler(handler))));
        self
    }

    pub fn build(self) -> Result<MethodRegistry, RegistryError> {
        let mut methods = HashMap::with_capacity(self.entries.len());

        for (spec, handler) in self.entries {
            if spec.name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if methods.contains_key(&spec.name) {
                return Err(RegistryError::DuplicateMethod(spec.name));
            }
            let descriptor = spec.into_descriptor();
            methods.insert(
                descriptor.name.clone(),
                RegisteredMethod {
                    descriptor,
                    handler,
                },
            );
        }

        Ok(MethodRegistry {
            methods,
            discovery: OnceLock::new(),
        })
    }
}

/// Fixed set of callable methods, immutable once built.
///
/// The serialized discovery document is computed on first use and cached for
/// the lifetime of the registry.
pub struct MethodRegistry {
    methods: HashMap<String, RegisteredMethod>,
    discovery: OnceLock<String>,
}

impl MethodRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry with no methods.
    pub fn empty() -> Self {
        Self {
            methods: HashMap::new(),
            discovery: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Descriptors sorted by name for deterministic output.
    pub fn descriptors(&self) -> Vec<MethodDescriptor> {
        let mut descriptors: Vec<MethodDescriptor> = self
            .methods
            .values()
            .map(|m| m.descriptor.clone())
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// The `{"methods": [...]}` document served by `GET /rpc/methods`.
    pub fn discovery(&self) -> &str {
        self.discovery.get_or_init(|| {
            let payload = MethodsResponse {
                methods: self.descriptors(),
            };
            serde_json::to_string(&payload).unwrap_or_else(|e| {
                tracing::warn!("Failed to serialize method descriptors: {e}");
                r#"{"methods":[]}"#.to_string()
            })
        })
    }

    /// Invoke `name` with positional `args`.
    ///
    /// A panic raised by the handler is reported as a failed invocation.
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> MethodResult {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| MethodError::UnknownMethod(name.to_string()))?;

        let fut = std::panic::catch_unwind(AssertUnwindSafe(|| method.handler.invoke(args)))
            .map_err(|_| panicked(name))?;

        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(panicked(name)),
        }
    }
}

fn panicked(name: &str) -> MethodError {
    tracing::error!("Method `{name}` panicked");
    MethodError::failed("internal error")
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn add(a: i64, b: i64) -> Result<i64, MethodError> {
        Ok(a + b)
    }

    async fn explode() -> Result<(), MethodError> {
        panic!("handler bug");
    }

    #[test]
    fn duplicate_names_fail_build() {
        let err = MethodRegistry::builder()
            .method("add", add)
            .method("add", add)
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateMethod("add".into()));
    }

    #[test]
    fn empty_name_fails_build() {
        let err = MethodRegistry::builder().method("", add).build().unwrap_err();
        assert_eq!(err, RegistryError::EmptyName);
    }

    #[test]
    fn name_only_spec_degrades_descriptor() {
        let registry = MethodRegistry::builder().method("add", add).build().unwrap();
        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].params.is_empty());
        assert_eq!(descriptors[0].return_type, None);
        assert_eq!(
            registry.discovery(),
            r#"{"methods":[{"name":"add","type":"function","params":[]}]}"#
        );
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let registry = MethodRegistry::empty();
        let err = registry.invoke("nope", vec![]).await.unwrap_err();
        assert_eq!(err, MethodError::UnknownMethod("nope".into()));
    }

    #[tokio::test]
    async fn panicking_handler_becomes_failure() {
        let registry = MethodRegistry::builder()
            .method("explode", explode)
            .build()
            .unwrap();
        let err = registry.invoke("explode", vec![]).await.unwrap_err();
        assert_eq!(err, MethodError::failed("internal error"));
    }
}
