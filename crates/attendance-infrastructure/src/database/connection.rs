//! Database connection pool and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use attendance_shared::config::DatabaseSettings;

use crate::error::InfraError;

pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_seconds))
        .connect(&settings.url)
        .await?;
    Ok(pool)
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}
