//! Persistence layer: entity models, repositories, and the [`VideoStore`]
//! seam the pipelines write through.
//!
//! Repositories are zero-sized structs with async methods over `&PgPool`,
//! using runtime-checked queries and `COLUMNS` constants. Schema lives in
//! `db/migrations` at the workspace root and is embedded via
//! [`sqlx::migrate!`].

pub mod models;
pub mod repositories;
pub mod store;

pub use store::{PgVideoStore, StoreError, VideoStore};

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
