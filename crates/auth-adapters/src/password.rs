//! Argon2id implementation of `PasswordHasher`.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use domains::{DomainError, PasswordHasher, Result};

#[derive(Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    /// Produces a PHC string (`$argon2id$v=19$…`) with a fresh 16-byte salt.
    fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; 16];
        getrandom::getrandom(&mut salt).map_err(|e| DomainError::IdGeneration(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| DomainError::Internal(format!("salt encoding failed: {e}")))?;

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::Internal(format!("password hashing failed: {e}")))
    }

    /// Verifies a password against a stored PHC string.
    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| DomainError::Internal(format!("stored password hash is malformed: {e}")))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
