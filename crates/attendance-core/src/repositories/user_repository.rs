//! User repository trait (port)

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::User;
use crate::error::DomainError;

/// Implementations report a duplicate username as
/// `UsernameAlreadyExists` and a second super administrator as
/// `SetupAlreadyCompleted`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn count(&self) -> Result<i64, DomainError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn create(&self, user: &User) -> Result<User, DomainError>;
    async fn update(&self, user: &User) -> Result<User, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError>;
    /// Never removes super administrators.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DomainError>;
    async fn delete_all(&self) -> Result<u64, DomainError>;
}
