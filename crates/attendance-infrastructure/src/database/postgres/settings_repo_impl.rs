//! PostgreSQL settings repository and health probe

use async_trait::async_trait;
use sqlx::PgPool;

use attendance_core::error::DomainError;
use attendance_core::repositories::{SettingsRepository, StoreHealth};

use super::db_error;

pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get_all(&self, user_group: &str) -> Result<Vec<(String, String)>, DomainError> {
        sqlx::query_as::<_, (String, String)>(
            "SELECT key, value FROM settings WHERE user_group = $1",
        )
        .bind(user_group)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("reading settings", e))
    }

    async fn set(&self, user_group: &str, key: &str, value: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO settings (user_group, key, value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_group, key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(user_group)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("writing setting", e))?;

        Ok(())
    }
}

pub struct PgStoreHealth {
    pool: PgPool,
}

impl PgStoreHealth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreHealth for PgStoreHealth {
    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("pinging database", e))?;
        Ok(())
    }
}
