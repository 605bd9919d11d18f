use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;

use super::AuthError;

const SALT_BYTES: usize = 16;

/// Hashes a password into an Argon2id PHC string.
pub fn hash(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|err| AuthError::Hashing(err.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hashing(err.to_string()))
}

/// Verified against when no real hash exists, so a login for an unknown
/// account costs the same Argon2 work as one for a known account.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash("intern-dashboard-placeholder").ok());

/// Runs a full verification against [`DUMMY_HASH`]; always `Ok(false)`.
pub fn verify_dummy(password: &str) -> Result<bool, AuthError> {
    match DUMMY_HASH.as_deref() {
        Some(stored_hash) => verify(password, stored_hash).map(|_| false),
        None => Err(AuthError::Hashing("dummy hash unavailable".to_string())),
    }
}

/// Returns `Ok(false)` on mismatch; errors only when the stored hash is unusable.
pub fn verify(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| AuthError::Hashing(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AuthError::Hashing(err.to_string())),
    }
}
