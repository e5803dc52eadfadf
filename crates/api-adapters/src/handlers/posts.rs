//! `/api/posts/*`
//!
//! Reads are public. Every mutating handler takes `AuthUser`, which is
//! what makes it a protected route.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use domains::Post;
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, PostId};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub comment: String,
}

/// Compact reply of the `/api/posts/{id}/like` style routes.
#[derive(Debug, Serialize)]
pub struct ReactionCounts {
    pub success: bool,
    pub likes: i64,
    pub dislikes: i64,
}

impl From<Post> for ReactionCounts {
    fn from(post: Post) -> Self {
        Self {
            success: true,
            likes: post.likes,
            dislikes: post.dislikes,
        }
    }
}

/// `POST /api/posts`
pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    JsonBody(body): JsonBody<PostBody>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.posts.create(&caller, body.title, body.content).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// `GET /api/posts`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.list().await?))
}

/// `GET /api/posts/{id}`
pub async fn get(
    State(state): State<AppState>,
    PostId(id): PostId,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.posts.get(id).await?))
}

/// `PUT /api/posts/{id}`
pub async fn update(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    PostId(id): PostId,
    JsonBody(body): JsonBody<PostBody>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .posts
        .update(id, body.title, body.content)
        .await?;
    Ok(Json(post))
}

/// `DELETE /api/posts/{id}`
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    PostId(id): PostId,
) -> Result<Json<MessageResponse>, ApiError> {
    state.posts.delete(id).await?;
    Ok(Json(MessageResponse::new("Post deleted successfully.")))
}

/// `PUT|POST /api/posts/like/{id}`
pub async fn like(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    PostId(id): PostId,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.posts.like(id).await?))
}

/// `PUT|POST /api/posts/dislike/{id}`
pub async fn dislike(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    PostId(id): PostId,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.posts.dislike(id).await?))
}

/// `POST /api/posts/{id}/like`
pub async fn like_counts(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    PostId(id): PostId,
) -> Result<Json<ReactionCounts>, ApiError> {
    Ok(Json(state.posts.like(id).await?.into()))
}

/// `POST /api/posts/{id}/dislike`
pub async fn dislike_counts(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    PostId(id): PostId,
) -> Result<Json<ReactionCounts>, ApiError> {
    Ok(Json(state.posts.dislike(id).await?.into()))
}

/// `POST /api/posts/comment/{id}`
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    PostId(id): PostId,
    JsonBody(body): JsonBody<CommentBody>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .posts
        .add_comment(id, body.username, body.comment)
        .await?;
    Ok(Json(post))
}
