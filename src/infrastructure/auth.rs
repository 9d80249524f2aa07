use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password hash error: {0}")]
    PasswordHashError(String),
}

/// One-way credential hashing. Implementations must use a salted,
/// memory-hard algorithm and verify without plain equality.
pub trait PasswordHasherTrait: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// True when `plaintext` matches `hash`. Mismatch handling is
    /// constant-time inside the verifier.
    fn validate(&self, hash: &str, plaintext: &str) -> bool;
}

#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasherTrait for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashError::PasswordHashError(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn validate(&self, hash: &str, plaintext: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_validate_round_trip() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("pwd123").unwrap();

        assert_ne!(hash, "pwd123");
        assert!(hasher.validate(&hash, "pwd123"));
        assert!(!hasher.validate(&hash, "pwd124"));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash("pwd123").unwrap();
        let second = hasher.hash("pwd123").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn validate_rejects_garbage_hash() {
        let hasher = Argon2PasswordHasher::new();
        assert!(!hasher.validate("not-a-phc-string", "pwd123"));
    }
}
