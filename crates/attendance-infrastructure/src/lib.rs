//! # Attendance Infrastructure
//!
//! PostgreSQL and in-memory implementations of the core repository ports.

pub mod database;
pub mod memory;
pub mod error;
pub mod repositories;

pub use database::{
    create_pool, run_migrations, PgMemberRepository, PgRecordRepository, PgSettingsRepository,
    PgStoreHealth, PgTableRepository, PgUserRepository,
};
pub use error::InfraError;
pub use memory::MemoryStore;
pub use repositories::Repositories;
