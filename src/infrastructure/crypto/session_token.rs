//! Session token generation
//!
//! The raw token travels only in the session cookie. Server-side state is
//! keyed by its SHA-256 digest.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Random bytes per token (64 hex chars)
const TOKEN_BYTES: usize = 32;

/// Generate a fresh opaque session token
pub fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; TOKEN_BYTES] = rng.gen();
    hex::encode(random_bytes)
}

/// Digest used as the server-side session key
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
