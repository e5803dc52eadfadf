//! # UserService
//!
//! Registration, login and profile lookup. Owns the credential rules:
//! usernames are unique, passwords are only ever stored hashed, and a
//! token is issued only after a successful hash comparison.

use std::sync::Arc;

use domains::{
    DomainError, DomainResult, Identity, PasswordHasher, Session, TokenService, User,
    UserRepository,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::validation::require;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Creates an account for `username`.
    ///
    /// The up-front lookup gives a cheap `Conflict` for the common case; the
    /// repository still enforces uniqueness on insert for concurrent signups.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: String, password: String) -> DomainResult<User> {
        let username = require("username", username)?;
        let password = require("password", password)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict("Username is already taken.".into()));
        }

        let password_hash = self.hasher.hash(&password).await?;
        let user = self.users.insert(User::new(username, password_hash)).await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Verifies credentials and issues a fresh session token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: String, password: String) -> DomainResult<Session> {
        let username = require("username", username)?;
        let password = require("password", password)?;

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", &username))?;

        if !self.hasher.verify(&password, &user.password_hash).await? {
            warn!(user_id = %user.id, "login rejected: password mismatch");
            return Err(DomainError::Unauthorized("Invalid password.".into()));
        }

        let issued = self.tokens.issue(&Identity::from(&user))?;
        info!(user_id = %user.id, "login succeeded");

        Ok(Session {
            token: issued.token,
            username: user.username,
            expires_at: issued.expires_at,
        })
    }

    /// Looks up the account behind a verified identity.
    pub async fn profile(&self, user_id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{IssuedToken, MockPasswordHasher, MockTokenService, MockUserRepository};
    use mockall::predicate::eq;

    fn stored_user(username: &str) -> User {
        User::new(username.to_string(), "$argon2id$stored".to_string())
    }

    fn service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
        tokens: MockTokenService,
    ) -> UserService {
        UserService::new(Arc::new(users), Arc::new(hasher), Arc::new(tokens))
    }

    #[tokio::test]
    async fn test_register_hashes_password_before_insert() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .with(eq("alice"))
            .returning(|_| Ok(None));
        users
            .expect_insert()
            .withf(|u| u.username == "alice" && u.password_hash == "hashed:s3cret")
            .times(1)
            .returning(Ok);

        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .with(eq("s3cret"))
            .returning(|p| Ok(format!("hashed:{p}")));

        let svc = service(users, hasher, MockTokenService::new());
        let user = svc.register("alice".into(), "s3cret".into()).await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_register_duplicate_username_is_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|name| Ok(Some(stored_user(name))));
        users.expect_insert().never();

        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().never();

        let svc = service(users, hasher, MockTokenService::new());
        let err = svc.register("alice".into(), "pw".into()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_requires_both_fields() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().never();

        let svc = service(users, MockPasswordHasher::new(), MockTokenService::new());
        let err = svc.register("".into(), "pw".into()).await.unwrap_err();
        assert_eq!(err, DomainError::Validation("username is required".into()));

        let err = svc.register("bob".into(), " ".into()).await.unwrap_err();
        assert_eq!(err, DomainError::Validation("password is required".into()));
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));

        let mut tokens = MockTokenService::new();
        tokens.expect_issue().never();

        let svc = service(users, MockPasswordHasher::new(), tokens);
        let err = svc.login("ghost".into(), "pw".into()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn test_login_wrong_password_issues_no_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|name| Ok(Some(stored_user(name))));

        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().returning(|_, _| Ok(false));

        let mut tokens = MockTokenService::new();
        tokens.expect_issue().never();

        let svc = service(users, hasher, tokens);
        let err = svc.login("alice".into(), "wrong".into()).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_login_success_returns_session() {
        let user = stored_user("alice");
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .withf(|pw, hash| pw == "right" && hash == "$argon2id$stored")
            .returning(|_, _| Ok(true));

        let expires_at = Utc::now();
        let mut tokens = MockTokenService::new();
        tokens
            .expect_issue()
            .withf(move |id| id.user_id == user_id && id.username == "alice")
            .times(1)
            .returning(move |_| {
                Ok(IssuedToken {
                    token: "signed".into(),
                    expires_at,
                })
            });

        let svc = service(users, hasher, tokens);
        let session = svc.login("alice".into(), "right".into()).await.unwrap();
        assert_eq!(session.token, "signed");
        assert_eq!(session.username, "alice");
        assert_eq!(session.expires_at, expires_at);
    }

    #[test]
    fn test_profile_missing_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(users, MockPasswordHasher::new(), MockTokenService::new());
        let err = tokio_test::block_on(svc.profile(Uuid::now_v7())).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
    }
}
