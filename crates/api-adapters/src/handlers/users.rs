//! `/api/users/*` and the `/api/login` alias.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use domains::User;
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// `email` is accepted for clients of the older login route.
    #[serde(default, alias = "email")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
    pub message: &'static str,
}

/// `POST /api/users/register`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.users.register(body.username, body.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully!")),
    ))
}

/// `POST /api/users/login`, `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = state.users.login(body.username, body.password).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        username: session.username,
        expires_at: session.expires_at,
        message: "Login successful!",
    }))
}

/// `GET /api/users/profile`
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.profile(caller.user_id).await?))
}
