//! Digest and salted password hashing demos.
//!
//! Stored password format: `sha256$<salt hex>$<digest hex>`, where the digest
//! covers the salt bytes followed by the UTF-8 password.

use sha2::{Digest, Sha256};

use crate::protocol::MethodError;

const SCHEME: &str = "sha256";
const SALT_BYTES: usize = 16;

pub async fn sha256(s: String) -> Result<String, MethodError> {
    Ok(hex::encode(Sha256::digest(s.as_bytes())))
}

pub async fn password(password: String) -> Result<String, MethodError> {
    let salt: [u8; SALT_BYTES] = rand::random();
    Ok(format!(
        "{SCHEME}${}${}",
        hex::encode(salt),
        hex::encode(salted_digest(&salt, &password))
    ))
}

pub async fn verify(password: String, stored: String) -> Result<bool, MethodError> {
    let (salt, expected) = parse_stored(&stored)?;
    Ok(constant_time_eq(&salted_digest(&salt, &password), &expected))
}

fn salted_digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn parse_stored(stored: &str) -> Result<(Vec<u8>, Vec<u8>), MethodError> {
    let malformed = || MethodError::invalid_arguments("stored hash is malformed");

    let mut parts = stored.split('$');
    let (Some(scheme), Some(salt), Some(digest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    if scheme != SCHEME {
        return Err(malformed());
    }

    let salt = hex::decode(salt).map_err(|_| malformed())?;
    let digest = hex::decode(digest).map_err(|_| malformed())?;
    if salt.is_empty() || digest.len() != 32 {
        return Err(malformed());
    }

    Ok((salt, digest))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
