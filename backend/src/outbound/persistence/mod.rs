//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Implements the `LineageRepository` port on top of PostgreSQL via
//! `diesel-async` with `bb8` connection pooling. The adapter translates
//! between Diesel row structs and domain records; schema definitions and
//! models stay internal to this module.
//!
//! The lineage tables carry the idempotency guarantee in their uniqueness
//! constraints (`UNIQUE NULLS NOT DISTINCT` where a key column is nullable),
//! and every save runs the insert-or-fetch sequence so concurrent writers
//! converge on one row.

mod diesel_lineage_repository;
mod idem_save;
mod models;
mod pool;
mod schema;

pub use diesel_lineage_repository::DieselLineageRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::ports::LineageRepositoryError;

/// Embedded migrations from the backend/migrations directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run all pending migrations against the given database URL.
///
/// Uses a synchronous connection; intended for startup and test setup, not
/// for request handling.
///
/// # Errors
///
/// Returns a connection error when the database is unreachable and a query
/// error when a migration fails to apply.
pub fn run_migrations(database_url: &str) -> Result<(), LineageRepositoryError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| LineageRepositoryError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| LineageRepositoryError::query(format!("migration: {err:?}")))?;
    Ok(())
}
