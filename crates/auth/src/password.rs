//! Adaptive password hashing (Argon2id, PHC string format).
//!
//! Verification is deliberately expensive; callers run it on a blocking thread
//! and never cache results.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("random source failed: {0}")]
    Rng(String),

    #[error("hashing failed: {0}")]
    Hash(String),
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Rng(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Hash(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Constant-time comparison of `password` against a stored PHC hash.
///
/// An unparseable hash never matches.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Well-formed Argon2id hash with the default cost parameters; no password matches it.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$+C20pisGnYXJHu0eBRlHyw$yrRZCWB2h5qWIJv1RFqB4g1uf5XOnJ3NDdznycGjubI";

/// Hash checked when the claimed account does not exist, so unknown emails pay
/// the same hashing cost as wrong passwords.
pub(crate) fn dummy_hash() -> &'static str {
    DUMMY_HASH
}
