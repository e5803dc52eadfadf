use std::sync::Arc;

use domains::TokenService;
use services::{PostService, UserService};

use crate::metrics::Metrics;

/// State shared across all request handlers. Built once at startup and
/// never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub tokens: Arc<dyn TokenService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(users: UserService, posts: PostService, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            users: Arc::new(users),
            posts: Arc::new(posts),
            tokens,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
