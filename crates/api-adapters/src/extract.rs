//! # Extractors
//!
//! `AuthUser` is the auth guard: any handler that takes it as an argument
//! is protected. Axum runs it before the body extractor and before the
//! handler body, so a rejected request never reaches a service.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};
use domains::{DomainError, Identity};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified caller, handed to the handler by value.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| DomainError::Unauthorized("Authentication required.".into()))?;

        let identity = state.tokens.verify(token)?;
        Ok(AuthUser(identity))
    }
}

/// Pulls `<token>` out of `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let (scheme, token) = headers.get(AUTHORIZATION)?.to_str().ok()?.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// `Json<T>` whose rejections use the API's JSON error shape.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| DomainError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// The `{id}` path segment as a post id. Undecodable segments and
/// non-uuid ids are both validation failures.
pub struct PostId(pub Uuid);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| DomainError::Validation(rejection.body_text()))?;
        parse_id(&raw).map(Self)
    }
}

/// Parses a path id, reporting garbage as a validation failure.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::from(DomainError::Validation(format!("invalid id: {raw}"))))
}
