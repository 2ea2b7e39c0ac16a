//! Member repository trait (port)

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::Member;
use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    pub table_id: Option<Uuid>,
    /// Restrict to members of tables owned by this group.
    pub user_group: Option<String>,
}

/// Implementations report a duplicate employee id within a table as
/// `EmployeeIdAlreadyExists` and a card bound twice as `CardAlreadyBound`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Member>, DomainError>;
    async fn find_by_card(&self, card_id: &str) -> Result<Option<Member>, DomainError>;
    async fn find_by_employee_id(
        &self,
        table_id: &Uuid,
        employee_id: &str,
    ) -> Result<Option<Member>, DomainError>;
    /// Newest joined first.
    async fn list(&self, filter: &MemberFilter) -> Result<Vec<Member>, DomainError>;
    async fn create(&self, member: &Member) -> Result<Member, DomainError>;
    async fn update(&self, member: &Member) -> Result<Member, DomainError>;
    /// Removes the member's records as well.
    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError>;
    async fn delete_many(
        &self,
        ids: &[Uuid],
        user_group: Option<String>,
    ) -> Result<u64, DomainError>;
}
