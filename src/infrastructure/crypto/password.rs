//! Password hashing utilities

use bcrypt::{hash, verify};

/// bcrypt work factor (2^10 rounds)
pub const PASSWORD_HASH_COST: u32 = 10;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, PASSWORD_HASH_COST)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}
