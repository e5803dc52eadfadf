//! Shared harness for the cross-crate tests: a router wired with the real
//! Argon2 and JWT adapters over in-memory repositories.

use std::sync::Arc;

use api_adapters::{router, AppState};
use auth_adapters::{Argon2PasswordHasher, JwtTokenService, PasswordHashConfig};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use domains::{PostRepository, UserRepository};
use serde_json::{json, Value};
use services::{PostService, UserService};
use storage_adapters::{InMemoryPostRepo, InMemoryUserRepo};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"integration-secret";

/// Cheap Argon2 parameters; production defaults are far too slow for tests.
pub fn fast_hasher() -> Arc<Argon2PasswordHasher> {
    Arc::new(
        Argon2PasswordHasher::new(PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("valid argon2 params"),
    )
}

pub fn token_service() -> Arc<JwtTokenService> {
    Arc::new(JwtTokenService::new(TEST_SECRET, Duration::hours(1), 0).expect("valid jwt config"))
}

#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub tokens: Arc<JwtTokenService>,
}

impl TestApp {
    /// In-memory stores, authors recorded.
    pub fn new() -> Self {
        Self::with_repos(
            Arc::new(InMemoryUserRepo::new()),
            Arc::new(InMemoryPostRepo::new()),
        )
    }

    pub fn with_repos(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        let tokens = token_service();
        let users = UserService::new(users, fast_hasher(), tokens.clone());
        let posts = PostService::new(posts, true);
        Self {
            router: router(AppState::new(users, posts, tokens.clone())),
            tokens,
        }
    }

    pub async fn call(
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
            .oneshot(req.body(body).expect("valid request"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn register(&self, username: &str, password: &str) -> StatusCode {
        self.call(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
        .0
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Registers `username` and returns a fresh bearer token for it.
    pub async fn signed_in(&self, username: &str) -> String {
        assert_eq!(self.register(username, "correct horse").await, StatusCode::CREATED);
        let (status, body) = self.login(username, "correct horse").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token in body").to_owned()
    }

    /// Creates a post and returns its id.
    pub async fn create_post(&self, token: &str, title: &str, content: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/posts",
                Some(token),
                Some(json!({ "title": title, "content": content })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().expect("id in body").to_owned()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
