//! # DomainError
//!
//! Centralized error handling for the linkboard ecosystem.
//! Every port returns these; the API layer maps each variant to one status.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("post not found with ID {0}")]
    PostNotFound(String),

    #[error("comment not found with ID {0}")]
    CommentNotFound(String),

    /// Wrong actor for a mutation, or a credential that failed verification.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Cookie missing, unknown or expired.
    #[error("no valid session")]
    NoSession,

    #[error("user {0} already exists")]
    AlreadyExists(String),

    #[error("user {0} not found")]
    NoSuchUser(String),

    #[error("invalid password")]
    BadPassword,

    /// Request failed a domain rule (e.g. empty comment, link post without url)
    #[error("validation error: {0}")]
    Validation(String),

    /// The OS randomness source refused to produce bytes.
    #[error("can't generate id: {0}")]
    IdGeneration(String),

    /// Infrastructure failure (e.g. DB down, Redis timeout)
    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    /// `true` for failures the client cannot fix by changing the request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DomainError::IdGeneration(_) | DomainError::Storage(_) | DomainError::Internal(_)
        )
    }
}

/// A specialized Result type for linkboard logic.
pub type Result<T> = std::result::Result<T, DomainError>;
