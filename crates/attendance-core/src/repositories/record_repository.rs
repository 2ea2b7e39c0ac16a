//! Record repository trait (port)

use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::{Record, RecordView};
use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub table_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    /// Matches either the check-in or the check-out date.
    pub date: Option<NaiveDate>,
    pub user_group: Option<String>,
}

/// A second record for the same (table, member, day) is reported as
/// `RecordAlreadyExists`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Record>, DomainError>;
    async fn find_for_day(
        &self,
        table_id: &Uuid,
        member_id: &Uuid,
        date: NaiveDate,
    ) -> Result<Option<Record>, DomainError>;
    /// Check-in date descending, then newest first.
    async fn list(&self, filter: &RecordFilter) -> Result<Vec<RecordView>, DomainError>;
    async fn list_by_table(&self, table_id: &Uuid) -> Result<Vec<Record>, DomainError>;
    async fn create(&self, record: &Record) -> Result<Record, DomainError>;
    async fn update(&self, record: &Record) -> Result<Record, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError>;
}
