pub mod posts;
pub mod users;

use axum::http::Uri;
use domains::DomainError;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// `GET /`
pub async fn index() -> &'static str {
    "Welcome to the Discussion Forum API!"
}

/// Fallback for paths no route matched.
pub async fn not_found(uri: Uri) -> ApiError {
    DomainError::not_found("Route", uri.path()).into()
}
