use serde_json::{Number, Value};

use crate::protocol::MethodError;

/// Integer operands stay integers while the result fits in an `i64`;
/// anything else is computed in floating point.
fn combine(
    a: &Number,
    b: &Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Number, MethodError> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(n) = int_op(x, y) {
            return Ok(Number::from(n));
        }
    }
    Number::from_f64(float_op(as_f64(a), as_f64(b)))
        .ok_or_else(|| MethodError::failed("result is not a finite number"))
}

fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

pub async fn add(a: Number, b: Number) -> Result<Value, MethodError> {
    combine(&a, &b, i64::checked_add, |x, y| x + y).map(Value::Number)
}

pub async fn subtract(a: Number, b: Number) -> Result<Value, MethodError> {
    combine(&a, &b, i64::checked_sub, |x, y| x - y).map(Value::Number)
}

pub async fn multiply(a: Number, b: Number) -> Result<Value, MethodError> {
    combine(&a, &b, i64::checked_mul, |x, y| x * y).map(Value::Number)
}

pub async fn divide(a: Number, b: Number) -> Result<Value, MethodError> {
    if as_f64(&b) == 0.0 {
        return Err(MethodError::failed("division by zero"));
    }
    combine(
        &a,
        &b,
        |x, y| x.checked_rem(y).filter(|r| *r == 0).and_then(|_| x.checked_div(y)),
        |x, y| x / y,
    )
    .map(Value::Number)
}

/// Variadic sum over every argument.
pub async fn sum(args: Vec<Value>) -> Result<Value, MethodError> {
    let mut total = Number::from(0);
    for (index, arg) in args.iter().enumerate() {
        let Value::Number(n) = arg else {
            return Err(MethodError::invalid_arguments(format!(
                "argument {index}: expected a number"
            )));
        };
        total = combine(&total, n, i64::checked_add, |x, y| x + y)?;
    }
    Ok(Value::Number(total))
}

/// Always fails; exercises the error path of the gateway.
pub async fn fail(message: Option<String>) -> Result<(), MethodError> {
    Err(MethodError::failed(message.unwrap_or_else(|| "boom".into())))
}
