//! # DomainError
//!
//! Centralized error handling for the forum.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain and port operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or malformed input (e.g., blank title, unparsable id)
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource already exists (e.g., duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource not found (e.g., User, Post)
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Absent credential or failed password check
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Token is malformed or its signature does not verify
    #[error("invalid token")]
    InvalidToken,

    /// Token verified but is past its expiry
    #[error("token expired")]
    TokenExpired,

    /// Infrastructure failure (e.g., DB down, hashing failure)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A specialized Result type for forum logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
