//! Uniform adapters between typed async functions and the registry.
//!
//! Every registered method is stored as a [`Invoke`] trait object taking the
//! positional JSON arguments of a request. Typed functions of arity 0 to 6 are
//! adapted through [`Handler`]: each argument is decoded with serde into the
//! declared parameter type before the function runs, so a decoding failure is
//! reported as [`MethodError::InvalidArguments`] and never reaches the handler.

use std::future::Future;
use std::marker::PhantomData;

use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::protocol::MethodError;

/// Outcome of one invocation, already encoded as JSON.
pub type MethodResult = Result<Value, MethodError>;

/// Type-erased callable stored in the registry.
pub trait Invoke: Send + Sync + 'static {
    fn invoke(&self, args: Vec<Value>) -> BoxFuture<'static, MethodResult>;
}

/// An async function whose positional parameters are decoded from JSON.
///
/// `T` is the tuple of parameter types and only exists to keep the blanket
/// implementations for different arities apart.
pub trait Handler<T>: Send + Sync + 'static {
    /// Number of positional parameters.
    fn arity(&self) -> usize;

    fn call(&self, args: Vec<Value>) -> BoxFuture<'static, MethodResult>;
}

/// Missing trailing arguments decode from `null`, which makes `Option<T>`
/// parameters optional.
fn decode_arg<A: DeserializeOwned>(
    args: &mut std::vec::IntoIter<Value>,
    index: usize,
) -> Result<A, MethodError> {
    let value = args.next().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| MethodError::invalid_arguments(format!("argument {index}: {e}")))
}

fn encode_result<R: Serialize>(value: R) -> MethodResult {
    serde_json::to_value(value)
        .map_err(|e| MethodError::failed(format!("result is not serializable: {e}")))
}

fn reject(err: MethodError) -> BoxFuture<'static, MethodResult> {
    future::ready(Err(err)).boxed()
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        impl<F, Fut, R, $($arg,)*> Handler<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<R, MethodError>> + Send + 'static,
            R: Serialize,
            $($arg: DeserializeOwned,)*
        {
            fn arity(&self) -> usize {
                const PARAMS: &[&str] = &[$(stringify!($arg)),*];
                PARAMS.len()
            }

            fn call(&self, args: Vec<Value>) -> BoxFuture<'static, MethodResult> {
                let arity = <Self as Handler<($($arg,)*)>>::arity(self);
                if args.len() > arity {
                    return reject(MethodError::invalid_arguments(format!(
                        "expected at most {arity} arguments, got {}",
                        args.len()
                    )));
                }

                let mut args = args.into_iter();
                let mut index = 0usize;
                $(
                    let $arg: $arg = match decode_arg(&mut args, index) {
                        Ok(value) => value,
                        Err(err) => return reject(err),
                    };
                    index += 1;
                )*

                let fut = (self)($($arg),*);
                async move { encode_result(fut.await?) }.boxed()
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);

/// Erases the parameter tuple of a typed [`Handler`].
pub(crate) struct TypedHandler<H, T> {
    handler: H,
    _params: PhantomData<fn() -> T>,
}

impl<H, T> TypedHandler<H, T> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _params: PhantomData,
        }
    }
}

impl<H, T> Invoke for TypedHandler<H, T>
where
    H: Handler<T>,
    T: 'static,
{
    fn invoke(&self, args: Vec<Value>) -> BoxFuture<'static, MethodResult> {
        self.handler.call(args)
    }
}

/// Variadic handler receiving the raw argument list.
pub(crate) struct RawHandler<F>(pub(crate) F);

impl<F, Fut, R> Invoke for RawHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, MethodError>> + Send + 'static,
    R: Serialize,
{
    fn invoke(&self, args: Vec<Value>) -> BoxFuture<'static, MethodResult> {
        let fut = (self.0)(args);
        async move { encode_result(fut.await?) }.boxed()
    }
}
