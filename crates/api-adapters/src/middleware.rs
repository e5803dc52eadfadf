//! rusty-forum/crates/api-adapters/src/middleware.rs Middleware
//!
//! Cross-cutting layers for CORS, request ids and panic recovery.

use std::any::Any;
use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tracing::error;

use crate::error::{ErrorBody, GENERIC_ERROR};

// Browser clients may live on any origin; credentials travel in the
// Authorization header, never in cookies.
pub fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Last-resort handler for `CatchPanicLayer`: log, then answer with the
/// same generic 500 body as any other internal failure.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(%detail, "handler panicked");

    let body = ErrorBody {
        error: GENERIC_ERROR.to_owned(),
        code: "internal_error",
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
