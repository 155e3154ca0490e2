// Password hashing
//
// Argon2id with per-password salts, stored as PHC strings. Hashing is CPU
// bound, so the async wrappers push it off the request threads.
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::ApiError;

pub fn hash_sync(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}

/// Constant-time verification against a stored PHC string. A hash that fails
/// to parse counts as a mismatch, not an error; legacy rows must not lock
/// the account behind a 500.
pub fn verify_sync(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn hash(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_sync(&password))
        .await
        .map_err(|e| ApiError::internal(format!("hash task failed: {e}")))?
        .map_err(ApiError::internal)
}

pub async fn verify(password: String, stored: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_sync(&password, &stored))
        .await
        .map_err(|e| ApiError::internal(format!("verify task failed: {e}")))
}
