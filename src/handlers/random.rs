use rand::distr::Alphanumeric;
use rand::Rng;

use crate::protocol::MethodError;

/// Upper bound for `random.string`.
pub const MAX_STRING_LENGTH: usize = 4096;

pub async fn uuid() -> Result<String, MethodError> {
    Ok(uuid::Uuid::new_v4().to_string())
}

/// Uniform integer in `min..=max`.
pub async fn int(min: i64, max: i64) -> Result<i64, MethodError> {
    if min > max {
        return Err(MethodError::invalid_arguments(format!(
            "min ({min}) must not exceed max ({max})"
        )));
    }
    Ok(uniform(min, max))
}

pub async fn string(length: usize) -> Result<String, MethodError> {
    if length > MAX_STRING_LENGTH {
        return Err(MethodError::invalid_arguments(format!(
            "length must be at most {MAX_STRING_LENGTH}"
        )));
    }
    Ok(alphanumeric(length))
}

fn uniform(min: i64, max: i64) -> i64 {
    rand::rng().random_range(min..=max)
}

fn alphanumeric(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
