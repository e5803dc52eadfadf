//! # rusty-forum
//!
//! The entry point that assembles the forum server from its settings and
//! the adapters enabled at compile time.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState};
use auth_adapters::{Argon2PasswordHasher, JwtTokenService, PasswordHashConfig};
use configs::{LogSettings, Settings, StorageBackend};
use domains::{PostRepository, UserRepository};
use secrecy::ExposeSecret;
use services::{PostService, UserService};
use storage_adapters::{InMemoryPostRepo, InMemoryUserRepo};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let (users, posts) = open_store(&settings).await?;

    let hasher = Argon2PasswordHasher::new(PasswordHashConfig {
        memory_kib: settings.auth.password.memory_kib,
        iterations: settings.auth.password.iterations,
        parallelism: settings.auth.password.parallelism,
    })?;
    let tokens = Arc::new(JwtTokenService::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        chrono::Duration::seconds(settings.auth.token_ttl_secs),
        settings.auth.leeway_secs,
    )?);

    let state = AppState::new(
        UserService::new(users, Arc::new(hasher), tokens.clone()),
        PostService::new(posts, settings.posts.record_author),
        tokens,
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, backend = ?settings.storage.backend, "rusty-forum listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down cleanly");
    Ok(())
}

/// `RUST_LOG` wins over `log.filter` when set.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let registry = Registry::default().with(filter);

    if log.json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

async fn open_store(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn UserRepository>, Arc<dyn PostRepository>)> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("using the in-memory store; data is lost on restart");
            Ok((
                Arc::new(InMemoryUserRepo::new()),
                Arc::new(InMemoryPostRepo::new()),
            ))
        }
        #[cfg(feature = "db-postgres")]
        StorageBackend::Postgres => {
            use storage_adapters::postgres::{connect, PgPostRepo, PgUserRepo};

            let url = settings
                .database
                .url
                .as_ref()
                .context("database.url is not set")?;
            let pool = connect(url.expose_secret(), settings.database.max_connections)
                .await
                .context("connecting to postgres")?;
            Ok((
                Arc::new(PgUserRepo::new(pool.clone())),
                Arc::new(PgPostRepo::new(pool)),
            ))
        }
        #[cfg(not(feature = "db-postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("this build has no postgres support; set storage.backend = \"memory\"")
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
