//! # Argon2 password hashing
//!
//! Argon2id with per-hash random salts, stored in PHC string format so the
//! parameters travel with each hash. Hashing is deliberately slow, so it
//! runs on tokio's blocking pool instead of an async worker.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher as _,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use domains::{DomainError, DomainResult, PasswordHasher};
use tracing::error;

use crate::AuthConfigError;

/// Cost settings for Argon2id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    /// OWASP's minimum recommendation for Argon2id.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new(config: PasswordHashConfig) -> Result<Self, AuthConfigError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthConfigError::HashParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> DomainResult<String> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(DomainError::internal)?
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            DomainError::internal(e)
        })
    }

    async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)?;
            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(HashError::Password) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(DomainError::internal)?
        .map_err(|e| {
            error!(error = %e, "stored password hash is unusable");
            DomainError::internal(e)
        })
    }
}
