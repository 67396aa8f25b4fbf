//! Credential hashing and bearer-token plumbing.
//!
//! Passwords are stored as PHC strings (PBKDF2-SHA256); tokens are
//! random 256-bit values handed to the client in URL-safe base64 and
//! persisted only as SHA-256 digests in the directory store.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;
use rand::RngCore;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::db::{lookup_token, store_token, StoreError};
use crate::models::Role;

/// Salt length in bytes for password hashing.
const SALT_LENGTH: usize = 16;

/// Issued tokens stay valid for a week.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

/// Errors from credential hashing.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Generate a random salt for password hashing.
fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Hash a password into a self-describing PHC string.
///
/// The string embeds algorithm, iteration count and salt, so stored
/// credentials survive future parameter changes.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(&generate_salt())
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    let hash = Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string.
///
/// Malformed stored strings verify as false rather than erroring, so a
/// corrupted row behaves like a wrong password.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

/// Generate a new bearer token (256-bit random, URL-safe base64).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a token for storage. Only the digest ever touches the database.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Expiry timestamp for a token issued now, in SQLite datetime format.
fn token_expiry() -> String {
    (Utc::now() + Duration::days(TOKEN_VALIDITY_DAYS))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Mint a token for a principal and persist its digest.
///
/// Returns the raw token for the client; the store only ever sees the
/// hash. Expired rows are swept opportunistically on each issue.
pub fn issue_token(
    conn: &Connection,
    role: &Role,
    principal_id: &str,
) -> Result<String, StoreError> {
    crate::db::delete_expired_tokens(conn)?;
    let token = generate_token();
    store_token(conn, &hash_token(&token), role, principal_id, &token_expiry())?;
    Ok(token)
}

/// Resolve a raw bearer token to its principal, if valid and unexpired.
pub fn resolve_token(
    conn: &Connection,
    token: &str,
) -> Result<Option<(Role, String)>, StoreError> {
    lookup_token(conn, &hash_token(token))
}
