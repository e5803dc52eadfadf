//! # Core Traits (Ports)
//!
//! Every adapter must implement these traits to be wired into the binary.
//! Repositories are expected to make each single-document mutation atomic.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{Comment, Identity, IssuedToken, Post, Reaction, User};

/// Persistence contract for user accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. Fails with `Conflict` if the username is taken.
    async fn insert(&self, user: User) -> DomainResult<User>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;
}

/// Persistence contract for posts and their embedded comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: Post) -> DomainResult<Post>;
    /// All posts, oldest first.
    async fn list(&self) -> DomainResult<Vec<Post>>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Post>>;

    /// Replaces title and content. `None` when the post does not exist.
    async fn update_content(
        &self,
        id: Uuid,
        title: String,
        content: String,
    ) -> DomainResult<Option<Post>>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;

    /// Atomically bumps the counter for `reaction` by one.
    async fn increment(&self, id: Uuid, reaction: Reaction) -> DomainResult<Option<Post>>;

    /// Atomically appends `comment` to the end of the comment list.
    async fn push_comment(&self, id: Uuid, comment: Comment) -> DomainResult<Option<Post>>;
}

/// Salted one-way password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> DomainResult<String>;
    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool>;
}

/// Issues and verifies signed session tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, identity: &Identity) -> DomainResult<IssuedToken>;
    /// Fails with `InvalidToken` or `TokenExpired`.
    fn verify(&self, token: &str) -> DomainResult<Identity>;
}
