//! # auth-adapters
//!
//! Credential plumbing behind the `PasswordHasher` and `TokenIssuer` ports.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2PasswordHasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenIssuer;
