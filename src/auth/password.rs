use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("argon2 hash failed: {0}")]
    Hash(String),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

lazy_static! {
    // Verified against when the email is unknown so that path costs the
    // same as a wrong password.
    static ref DUMMY_HASH: String = hash_password("dummy-password-for-timing").unwrap_or_default();
}

/// Builds the dummy hash up front so the first unknown-email login does not
/// pay for it.
pub fn warm_up() {
    lazy_static::initialize(&DUMMY_HASH);
}

pub fn hash_password(plain: &str) -> Result<String, CryptoError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            CryptoError::Hash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// `false` on mismatch and on a hash that does not parse.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash does not parse");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

pub async fn hash_password_blocking(plain: String) -> Result<String, CryptoError> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

pub async fn verify_password_blocking(hash: String, plain: String) -> Result<bool, CryptoError> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&hash, &plain)).await?)
}

/// Burns one verification against a throwaway hash. Always `false`.
pub async fn verify_dummy(plain: String) -> Result<bool, CryptoError> {
    tokio::task::spawn_blocking(move || {
        verify_password(&DUMMY_HASH, &plain);
    })
    .await?;
    Ok(false)
}
