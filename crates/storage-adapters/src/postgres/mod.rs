//! # PostgreSQL store
//!
//! Maps the relational tables onto the `domains` models. Every post
//! mutation is a single `UPDATE ... RETURNING` statement, so concurrent
//! likes and comment appends never lose writes.

mod posts;
mod users;

pub use posts::PgPostRepo;
pub use users::PgUserRepo;

use domains::DomainError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

const SCHEMA: &str = include_str!("schema.sql");

/// Postgres error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Name Postgres gives the `UNIQUE` constraint on `users.username`.
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Opens a pool and makes sure the tables exist.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(db_error)?;

    bootstrap(&pool).await?;
    info!(max_connections, "postgres pool ready");
    Ok(pool)
}

/// Creates the forum tables if they are missing.
pub async fn bootstrap(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await.map_err(db_error)?;
    Ok(())
}

/// Classifies a driver error. Only uniqueness failures carry meaning for
/// callers; everything else is an opaque internal failure.
pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    if let Some(db) = err.as_database_error() {
        if db.code().is_some_and(|code| code == UNIQUE_VIOLATION) {
            return unique_violation(db.constraint());
        }
    }

    error!(error = %err, "database operation failed");
    DomainError::internal(err)
}

fn unique_violation(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some(USERNAME_CONSTRAINT) => DomainError::Conflict("Username is already taken.".into()),
        other => {
            error!(constraint = ?other, "unexpected unique violation");
            DomainError::Conflict("Record already exists.".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_username_constraint_reports_taken_username() {
        assert_eq!(
            unique_violation(Some(USERNAME_CONSTRAINT)),
            DomainError::Conflict("Username is already taken.".into())
        );
        assert_eq!(
            unique_violation(Some("posts_pkey")),
            DomainError::Conflict("Record already exists.".into())
        );
        assert_eq!(
            unique_violation(None),
            DomainError::Conflict("Record already exists.".into())
        );
    }
}
