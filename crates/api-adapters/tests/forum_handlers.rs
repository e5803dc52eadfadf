//! HTTP contract tests: status codes, error bodies and the auth guard,
//! exercised through the full router with in-memory adapters.

use std::sync::Arc;

use api_adapters::{router, AppState};
use auth_adapters::{Argon2PasswordHasher, JwtTokenService, PasswordHashConfig};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use domains::Identity;
use serde_json::{json, Value};
use services::{PostService, UserService};
use storage_adapters::{InMemoryPostRepo, InMemoryUserRepo};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    tokens: Arc<JwtTokenService>,
}

fn test_app() -> TestApp {
    let tokens = Arc::new(
        JwtTokenService::new(b"handler-test-secret", Duration::hours(1), 0).unwrap(),
    );
    let hasher = Arc::new(
        Argon2PasswordHasher::new(PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap(),
    );

    let users = UserService::new(Arc::new(InMemoryUserRepo::new()), hasher, tokens.clone());
    let posts = PostService::new(Arc::new(InMemoryPostRepo::new()), true);

    TestApp {
        router: router(AppState::new(users, posts, tokens.clone())),
        tokens,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Registers and logs in `username`, returning the bearer token.
    async fn login_as(&self, username: &str) -> String {
        let creds = json!({ "username": username, "password": "pw-123" });
        let (status, _) = self
            .call(Method::POST, "/api/users/register", None, Some(creds.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .call(Method::POST, "/api/users/login", None, Some(creds))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_owned()
    }
}

#[tokio::test]
async fn test_register_duplicate_is_400_conflict() {
    let app = test_app();
    app.login_as("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({ "username": "alice", "password": "other" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["error"], "Username is already taken.");
}

#[tokio::test]
async fn test_register_missing_field_is_validation_error() {
    let app = test_app();
    let (status, body) = app
        .call(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({ "username": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_login_failures() {
    let app = test_app();
    app.login_as("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "username": "alice", "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());

    let (status, _) = app
        .call(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "username": "nobody", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_legacy_login_route_accepts_email_field() {
    let app = test_app();
    app.login_as("carol").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "carol", "password": "pw-123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "carol");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_profile_hides_password_hash() {
    let app = test_app();
    let token = app.login_as("dave").await;

    let (status, body) = app
        .call(Method::GET, "/api/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "dave");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_profile_for_unknown_subject_is_404() {
    let app = test_app();
    let ghost = app
        .tokens
        .issue_at(
            &Identity {
                user_id: Uuid::now_v7(),
                username: "ghost".into(),
            },
            Utc::now(),
        )
        .unwrap();

    let (status, _) = app
        .call(Method::GET, "/api/users/profile", Some(&ghost.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_without_token_writes_nothing() {
    let app = test_app();
    let post = json!({ "title": "t", "content": "c" });

    let (status, body) = app
        .call(Method::POST, "/api/posts", None, Some(post.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, body) = app
        .call(Method::POST, "/api/posts", Some("garbage"), Some(post))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_token");

    let (_, listed) = app.call(Method::GET, "/api/posts", None, None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_expired_token_is_reported_distinctly() {
    let app = test_app();
    let stale = app
        .tokens
        .issue_at(
            &Identity {
                user_id: Uuid::now_v7(),
                username: "erin".into(),
            },
            Utc::now() - Duration::hours(2),
        )
        .unwrap();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/posts",
            Some(&stale.token),
            Some(json!({ "title": "t", "content": "c" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "token_expired");
}

#[tokio::test]
async fn test_post_id_errors() {
    let app = test_app();

    let (status, body) = app.call(Method::GET, "/api/posts/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = app.call(Method::GET, "/api/posts/%FF", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(body["error"].is_string());

    let missing = format!("/api/posts/{}", Uuid::now_v7());
    let (status, body) = app.call(Method::GET, &missing, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found.");
}

#[tokio::test]
async fn test_create_records_author_and_malformed_json_is_400() {
    let app = test_app();
    let token = app.login_as("frank").await;

    let (status, post) = app
        .call(
            Method::POST,
            "/api/posts",
            Some(&token),
            Some(json!({ "title": "Hello", "content": "World" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["likes"], 0);
    assert_eq!(post["dislikes"], 0);
    assert_eq!(post["comments"], json!([]));
    assert!(post["author"].is_string());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/posts")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reaction_count_route_returns_counts_only() {
    let app = test_app();
    let token = app.login_as("gina").await;
    let (_, post) = app
        .call(
            Method::POST,
            "/api/posts",
            Some(&token),
            Some(json!({ "title": "t", "content": "c" })),
        )
        .await;
    let id = post["id"].as_str().unwrap();

    let (status, body) = app
        .call(Method::POST, &format!("/api/posts/{id}/like"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "likes": 1, "dislikes": 0 }));

    let (_, body) = app
        .call(Method::PUT, &format!("/api/posts/dislike/{id}"), Some(&token), None)
        .await;
    assert_eq!(body["likes"], 1);
    assert_eq!(body["dislikes"], 1);
    assert_eq!(body["title"], "t");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = test_app();
    let (status, body) = app.call(Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_metrics_count_requests_by_route() {
    let app = test_app();
    app.call(Method::GET, "/api/posts", None, None).await;

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains(r#"method="GET",route="/api/posts",status="200"} 1"#));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = test_app();
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let app = test_app();
    let token = app.login_as("hank").await;

    let req = Request::builder()
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
