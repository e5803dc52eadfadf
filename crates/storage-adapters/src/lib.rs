//! # storage-adapters
//!
//! Implementations of the `domains` repository ports.
//!
//! - `memory`: always compiled; `DashMap`-backed, process-local.
//! - `postgres`: behind the `db-postgres` feature; `sqlx` over a `PgPool`.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::{InMemoryPostRepo, InMemoryUserRepo};
