//! # In-memory store
//!
//! `DashMap`-backed implementations of the repository ports. Each post
//! mutation runs under the shard lock of its entry, which gives the same
//! per-document atomicity the database adapter gets from single-statement
//! updates. Used for tests and for `storage.backend = "memory"`.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use domains::{
    Comment, DomainError, DomainResult, Post, PostRepository, Reaction, User, UserRepository,
};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryUserRepo {
    users: DashMap<Uuid, User>,
    /// username -> id; the entry lock here is what makes usernames unique.
    by_username: DashMap<String, Uuid>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn insert(&self, user: User) -> DomainResult<User> {
        match self.by_username.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(
                "Username is already taken.".into(),
            )),
            Entry::Vacant(slot) => {
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user)
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let Some(id) = self.by_username.get(username).map(|r| *r.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }
}

#[derive(Default)]
pub struct InMemoryPostRepo {
    posts: DashMap<Uuid, Post>,
}

impl InMemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the stored post while holding its entry lock.
    fn mutate(&self, id: Uuid, f: impl FnOnce(&mut Post)) -> Option<Post> {
        self.posts.get_mut(&id).map(|mut entry| {
            f(entry.value_mut());
            entry.value().clone()
        })
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepo {
    async fn insert(&self, post: Post) -> DomainResult<Post> {
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list(&self) -> DomainResult<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.iter().map(|r| r.value().clone()).collect();
        // v7 ids are time-ordered, so they break created_at ties stably
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(posts)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Post>> {
        Ok(self.posts.get(&id).map(|r| r.value().clone()))
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: String,
        content: String,
    ) -> DomainResult<Option<Post>> {
        Ok(self.mutate(id, |post| {
            post.title = title;
            post.content = content;
            post.updated_at = Utc::now();
        }))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.posts.remove(&id).is_some())
    }

    async fn increment(&self, id: Uuid, reaction: Reaction) -> DomainResult<Option<Post>> {
        Ok(self.mutate(id, |post| match reaction {
            Reaction::Like => post.likes += 1,
            Reaction::Dislike => post.dislikes += 1,
        }))
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> DomainResult<Option<Post>> {
        Ok(self.mutate(id, |post| post.comments.push(comment)))
    }
}
