//! Domain-level errors.
//!
//! These errors represent business rule violations and credential mechanism
//! failures. They are independent of infrastructure concerns (HTTP, database).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller supplied malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password did not match the stored hash
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Hashing mechanism failed or a stored hash is corrupt
    #[error("Hashing error: {0}")]
    Hashing(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a hashing error
    pub fn hashing(msg: impl Into<String>) -> Self {
        DomainError::Hashing(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Bearer token failures.
///
/// Parsing distinguishes expired, forged and unparseable tokens so callers
/// can tell them apart in diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token could not be issued: {0}")]
    Issue(String),
}
