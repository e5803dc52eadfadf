//! # PostService
//!
//! CRUD plus reactions and comments on posts. Every mutation here is
//! reached only after the HTTP layer has verified a bearer token; the
//! service receives the caller as an explicit `Identity` where it needs it.

use std::sync::Arc;

use domains::{
    Comment, DomainError, DomainResult, Identity, Post, PostRepository, Reaction,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::validation::require;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    /// When set, new posts carry the creator's user id.
    record_author: bool,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, record_author: bool) -> Self {
        Self {
            posts,
            record_author,
        }
    }

    #[instrument(skip(self, content), fields(user_id = %author.user_id))]
    pub async fn create(
        &self,
        author: &Identity,
        title: String,
        content: String,
    ) -> DomainResult<Post> {
        let title = require("title", title)?;
        let content = require("content", content)?;

        let author_id = self.record_author.then_some(author.user_id);
        let post = self.posts.insert(Post::new(title, content, author_id)).await?;

        info!(post_id = %post.id, "post created");
        Ok(post)
    }

    pub async fn list(&self) -> DomainResult<Vec<Post>> {
        self.posts.list().await
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Post> {
        self.posts.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Replaces title and content; counters and comments are left alone.
    #[instrument(skip(self, title, content))]
    pub async fn update(&self, id: Uuid, title: String, content: String) -> DomainResult<Post> {
        let title = require("title", title)?;
        let content = require("content", content)?;

        let post = self
            .posts
            .update_content(id, title, content)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!("post updated");
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.posts.delete(id).await? {
            return Err(not_found(id));
        }
        info!("post deleted");
        Ok(())
    }

    pub async fn like(&self, id: Uuid) -> DomainResult<Post> {
        self.react(id, Reaction::Like).await
    }

    pub async fn dislike(&self, id: Uuid) -> DomainResult<Post> {
        self.react(id, Reaction::Dislike).await
    }

    #[instrument(skip(self))]
    async fn react(&self, id: Uuid, reaction: Reaction) -> DomainResult<Post> {
        let post = self
            .posts
            .increment(id, reaction)
            .await?
            .ok_or_else(|| not_found(id))?;

        debug!(likes = post.likes, dislikes = post.dislikes, "reaction recorded");
        Ok(post)
    }

    /// Appends a comment. `username` is taken as submitted; it is not
    /// checked against the caller's identity.
    #[instrument(skip(self, comment))]
    pub async fn add_comment(
        &self,
        id: Uuid,
        username: String,
        comment: String,
    ) -> DomainResult<Post> {
        let comment = Comment {
            username: require("username", username)?,
            comment: require("comment", comment)?,
        };

        let post = self
            .posts
            .push_comment(id, comment)
            .await?
            .ok_or_else(|| not_found(id))?;

        debug!(comments = post.comments.len(), "comment appended");
        Ok(post)
    }
}

fn not_found(id: Uuid) -> DomainError {
    DomainError::not_found("Post", id)
}
