//! Settings repository trait (port) and store health probe

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::DomainError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_all(&self, user_group: &str) -> Result<Vec<(String, String)>, DomainError>;
    /// Insert or replace.
    async fn set(&self, user_group: &str, key: &str, value: &str) -> Result<(), DomainError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), DomainError>;
}
