//! # api-adapters
//!
//! The HTTP routing and orchestration layer for the forum.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod metrics;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use state::AppState;

#[cfg(feature = "web-axum")]
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

/// Builds the complete router: routes, fallback and middleware stack.
///
/// # Developer Note
/// Layers are listed innermost first. Request ids are assigned before the
/// trace span opens so every log line of a request carries its id.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> Router {
    use handlers::{posts, users};
    use tower_http::{
        catch_panic::CatchPanicLayer,
        request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
        trace::TraceLayer,
    };

    let api = Router::new()
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/login", post(users::login))
        .route("/api/users/profile", get(users::profile))
        .route("/api/posts", get(posts::list).post(posts::create))
        .route(
            "/api/posts/{id}",
            get(posts::get).put(posts::update).delete(posts::delete),
        )
        .route("/api/posts/like/{id}", post(posts::like).put(posts::like))
        .route(
            "/api/posts/dislike/{id}",
            post(posts::dislike).put(posts::dislike),
        )
        .route("/api/posts/{id}/like", post(posts::like_counts))
        .route("/api/posts/{id}/dislike", post(posts::dislike_counts))
        .route("/api/posts/comment/{id}", post(posts::add_comment));

    Router::new()
        .route("/", get(handlers::index))
        .route("/metrics", get(metrics::render))
        .merge(api)
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), metrics::track_requests))
        .layer(middleware::cors_policy())
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
