//! # auth-adapters
//!
//! Implementations of the `PasswordHasher` and `TokenService` ports.
//! Argon2 hashing is always compiled; JWT tokens sit behind `auth-jwt`.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::{Argon2PasswordHasher, PasswordHashConfig};

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenService;

use thiserror::Error;

/// Rejected adapter configuration, surfaced at startup.
#[derive(Debug, Error)]
pub enum AuthConfigError {
    #[error("invalid password hash parameters: {0}")]
    HashParams(String),

    #[error("token signing secret must not be empty")]
    EmptySecret,

    #[error("token lifetime must be positive, got {0}s")]
    TokenTtl(i64),
}
