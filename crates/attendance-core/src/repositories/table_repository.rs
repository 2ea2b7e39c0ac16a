//! Attendance table repository trait (port)

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::{AttendanceTable, TableSummary};
use crate::error::DomainError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TableRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AttendanceTable>, DomainError>;
    async fn find_summary(&self, id: &Uuid) -> Result<Option<TableSummary>, DomainError>;
    /// Newest first; `None` lists every group.
    async fn list(&self, user_group: Option<String>) -> Result<Vec<TableSummary>, DomainError>;
    async fn create(&self, table: &AttendanceTable) -> Result<AttendanceTable, DomainError>;
    async fn update(&self, table: &AttendanceTable) -> Result<AttendanceTable, DomainError>;
    /// Removes the table's members and records as well.
    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError>;
}
