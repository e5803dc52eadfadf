//! # JWT session tokens
//!
//! HS256-signed tokens carrying `{sub, username, iat, exp}`. The signing
//! key is built once from configuration and never changes at runtime.

use chrono::{DateTime, Duration, Utc};
use domains::{DomainError, DomainResult, Identity, IssuedToken, TokenService};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::AuthConfigError;

/// Validity window used when none is configured.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl: Duration, leeway_secs: u64) -> Result<Self, AuthConfigError> {
        if secret.is_empty() {
            return Err(AuthConfigError::EmptySecret);
        }
        if ttl <= Duration::zero() {
            return Err(AuthConfigError::TokenTtl(ttl.num_seconds()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Signs a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> DomainResult<IssuedToken> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: identity.user_id,
            username: identity.username.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |e| {
                error!(error = %e, "token signing failed");
                DomainError::internal(e)
            },
        )?;

        Ok(IssuedToken { token, expires_at })
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, identity: &Identity) -> DomainResult<IssuedToken> {
        self.issue_at(identity, Utc::now())
    }

    fn verify(&self, token: &str) -> DomainResult<Identity> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(reason = ?e.kind(), "token rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::TokenExpired,
                _ => DomainError::InvalidToken,
            }
        })?;

        Ok(Identity {
            user_id: data.claims.sub,
            username: data.claims.username,
        })
    }
}
