//! crates/dermascan_core/src/credentials.rs
//!
//! Password hashing for the local account ledger.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::SessionError;

/// Hashes a password into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, SessionError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SessionError::Credentials(format!("failed to hash password: {}", e)))
}

/// Checks a password against a stored PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, SessionError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| SessionError::Credentials(format!("invalid stored hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
