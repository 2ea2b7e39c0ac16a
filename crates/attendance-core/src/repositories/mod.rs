//! Repository traits (ports)

pub mod user_repository;
pub mod table_repository;
pub mod member_repository;
pub mod record_repository;
pub mod settings_repository;

pub use user_repository::UserRepository;
pub use table_repository::TableRepository;
pub use member_repository::{MemberFilter, MemberRepository};
pub use record_repository::{RecordFilter, RecordRepository};
pub use settings_repository::{SettingsRepository, StoreHealth};

#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use table_repository::MockTableRepository;
#[cfg(test)]
pub use member_repository::MockMemberRepository;
#[cfg(test)]
pub use record_repository::MockRecordRepository;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
