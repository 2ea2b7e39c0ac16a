//! PostgreSQL repository implementations

pub mod user_repo_impl;
pub mod table_repo_impl;
pub mod member_repo_impl;
pub mod record_repo_impl;
pub mod settings_repo_impl;

pub use user_repo_impl::PgUserRepository;
pub use table_repo_impl::PgTableRepository;
pub use member_repo_impl::PgMemberRepository;
pub use record_repo_impl::PgRecordRepository;
pub use settings_repo_impl::{PgSettingsRepository, PgStoreHealth};

use attendance_core::error::DomainError;
use tracing::error;

/// Log and wrap a query failure.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

/// Name of the unique constraint a failed write ran into, if any.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}
