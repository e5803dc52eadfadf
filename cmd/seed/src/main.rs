//! Populates the configured Postgres store with a demo account and a few
//! posts. Safe to run repeatedly: an existing demo user is reused.

use std::sync::Arc;

use anyhow::{bail, Context};
use auth_adapters::{Argon2PasswordHasher, JwtTokenService, PasswordHashConfig};
use configs::{Settings, StorageBackend};
use domains::{DomainError, Identity, UserRepository};
use secrecy::ExposeSecret;
use services::{PostService, UserService};
use storage_adapters::postgres::{connect, PgPostRepo, PgUserRepo};
use tracing::info;

const DEMO_USER: &str = "demo";
const DEMO_PASSWORD: &str = "demo-password";

const DEMO_POSTS: [(&str, &str); 3] = [
    ("Welcome", "Introduce yourself to the forum."),
    ("House rules", "Be kind. Stay on topic."),
    ("Feature requests", "What should the forum do next?"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let settings = Settings::load().context("loading settings")?;
    if settings.storage.backend != StorageBackend::Postgres {
        bail!("seeding only makes sense for the postgres backend");
    }
    let url = settings
        .database
        .url
        .as_ref()
        .context("database.url is not set")?;
    let pool = connect(url.expose_secret(), settings.database.max_connections).await?;

    let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepo::new(pool.clone()));
    let hasher = Argon2PasswordHasher::new(PasswordHashConfig {
        memory_kib: settings.auth.password.memory_kib,
        iterations: settings.auth.password.iterations,
        parallelism: settings.auth.password.parallelism,
    })?;
    let tokens = JwtTokenService::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        chrono::Duration::seconds(settings.auth.token_ttl_secs),
        settings.auth.leeway_secs,
    )?;
    let users = UserService::new(user_repo.clone(), Arc::new(hasher), Arc::new(tokens));
    let posts = PostService::new(Arc::new(PgPostRepo::new(pool)), settings.posts.record_author);

    let demo = match users.register(DEMO_USER.into(), DEMO_PASSWORD.into()).await {
        Ok(user) => {
            info!(username = DEMO_USER, "created demo user");
            user
        }
        Err(DomainError::Conflict(_)) => user_repo
            .find_by_username(DEMO_USER)
            .await?
            .context("demo user vanished")?,
        Err(e) => return Err(e.into()),
    };

    let author = Identity::from(&demo);
    for (title, content) in DEMO_POSTS {
        let post = posts.create(&author, title.into(), content.into()).await?;
        info!(id = %post.id, title, "created post");
    }

    info!(posts = DEMO_POSTS.len(), "seed complete");
    Ok(())
}
