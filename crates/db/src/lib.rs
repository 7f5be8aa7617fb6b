//! PostgreSQL persistence for Boardwalk.
//!
//! - [`models`] -- `FromRow` row structs and their conversion to domain types.
//! - [`repositories`] -- zero-sized repos with async queries over `&PgPool`.
//! - [`stores`] -- [`BoardStore`](boardwalk_core::store::BoardStore) and
//!   [`AccountDirectory`](boardwalk_core::account::AccountDirectory)
//!   implementations on top of the repositories.

pub mod models;
pub mod repositories;
pub mod stores;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
