//! # ApiError
//!
//! Maps `DomainError` onto HTTP status codes and a JSON body of the form
//! `{"error": "...", "code": "..."}`. Internal failures are logged in full
//! and reported to the client with a generic message only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domains::DomainError;
use serde::Serialize;
use tracing::error;

/// Message returned for every 5xx response.
pub const GENERIC_ERROR: &str = "Something went wrong!";

#[derive(Debug)]
pub struct ApiError(pub DomainError);

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Unauthorized(_)
            | DomainError::InvalidToken
            | DomainError::TokenExpired => StatusCode::UNAUTHORIZED,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match &self.0 {
            DomainError::Validation(_) => "validation_error",
            DomainError::Conflict(_) => "conflict",
            DomainError::NotFound { .. } => "not_found",
            DomainError::Unauthorized(_) => "unauthorized",
            DomainError::InvalidToken => "invalid_token",
            DomainError::TokenExpired => "token_expired",
            DomainError::Internal(_) => "internal_error",
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            DomainError::Validation(msg)
            | DomainError::Conflict(msg)
            | DomainError::Unauthorized(msg) => msg.clone(),
            DomainError::NotFound { entity, .. } => format!("{entity} not found."),
            DomainError::InvalidToken => "Invalid token.".into(),
            DomainError::TokenExpired => "Token expired.".into(),
            DomainError::Internal(_) => GENERIC_ERROR.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let DomainError::Internal(detail) = &self.0 {
            error!(%detail, "request failed");
        }

        let body = ErrorBody {
            error: self.message(),
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}
