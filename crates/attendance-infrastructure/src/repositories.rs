//! Repository bundle selected from the database URL

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use attendance_core::repositories::{
    MemberRepository, RecordRepository, SettingsRepository, StoreHealth, TableRepository,
    UserRepository,
};
use attendance_shared::config::DatabaseSettings;
use attendance_shared::constants::MEMORY_DATABASE_URL;

use crate::database::{
    create_pool, run_migrations, PgMemberRepository, PgRecordRepository, PgSettingsRepository,
    PgStoreHealth, PgTableRepository, PgUserRepository,
};
use crate::error::InfraError;
use crate::memory::MemoryStore;

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tables: Arc<dyn TableRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub records: Arc<dyn RecordRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    /// Connect to PostgreSQL and migrate, or build an in-memory store for
    /// `memory://`.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, InfraError> {
        if settings.url == MEMORY_DATABASE_URL {
            warn!("Using the in-memory store, data is lost on exit");
            return Ok(Self::memory());
        }

        let pool = create_pool(settings).await?;
        info!("Database pool created");
        run_migrations(&pool).await?;
        Ok(Self::postgres(pool))
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            tables: Arc::new(PgTableRepository::new(pool.clone())),
            members: Arc::new(PgMemberRepository::new(pool.clone())),
            records: Arc::new(PgRecordRepository::new(pool.clone())),
            settings: Arc::new(PgSettingsRepository::new(pool.clone())),
            health: Arc::new(PgStoreHealth::new(pool)),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            tables: store.clone(),
            members: store.clone(),
            records: store.clone(),
            settings: store.clone(),
            health: store,
        }
    }
}
