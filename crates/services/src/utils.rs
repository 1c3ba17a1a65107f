//! Opaque identifier generation.

use domains::{DomainError, Result};

/// 12 random bytes, hex encoded. Used for users, posts and comments.
pub fn generate_id() -> Result<String> {
    random_hex::<12>()
}

/// 16 random bytes, hex encoded.
pub fn generate_session_id() -> Result<String> {
    random_hex::<16>()
}

fn random_hex<const N: usize>() -> Result<String> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes).map_err(|e| DomainError::IdGeneration(e.to_string()))?;
    Ok(hex::encode(bytes))
}
