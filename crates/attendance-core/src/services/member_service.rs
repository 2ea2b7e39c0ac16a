// ============================================================================
// Attendance Core - Member Service
// File: crates/attendance-core/src/services/member_service.rs
// ============================================================================
//! Table members and their card bindings

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use attendance_shared::utils::normalize_card_id;

use crate::domain::{Actor, Member};
use crate::error::DomainError;
use crate::repositories::{MemberFilter, MemberRepository, TableRepository};

use super::table_service::load_table;

#[derive(Debug, Clone)]
pub struct CreateMember {
    pub table_id: Uuid,
    pub name: String,
    pub employee_id: String,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMember {
    pub name: Option<String>,
    pub employee_id: Option<String>,
    pub contact: Option<String>,
}

pub struct MemberService {
    member_repo: Arc<dyn MemberRepository>,
    table_repo: Arc<dyn TableRepository>,
}

impl MemberService {
    pub fn new(member_repo: Arc<dyn MemberRepository>, table_repo: Arc<dyn TableRepository>) -> Self {
        Self {
            member_repo,
            table_repo,
        }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        table_id: Option<Uuid>,
    ) -> Result<Vec<Member>, DomainError> {
        if let Some(table_id) = table_id {
            load_table(self.table_repo.as_ref(), actor, &table_id).await?;
        }
        self.member_repo
            .list(&MemberFilter {
                table_id,
                user_group: actor.group_scope().map(str::to_string),
            })
            .await
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<Member, DomainError> {
        self.load_member(actor, id).await
    }

    pub async fn create(&self, actor: &Actor, input: CreateMember) -> Result<Member, DomainError> {
        actor.require_admin()?;
        load_table(self.table_repo.as_ref(), actor, &input.table_id).await?;

        let member = Member::new(input.table_id, input.name, input.employee_id, input.contact)?;
        self.ensure_employee_id_free(&member.table_id, &member.employee_id, None)
            .await?;

        let created = self.member_repo.create(&member).await?;
        info!("Member {} added to table {}", created.employee_id, created.table_id);
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &Uuid,
        input: UpdateMember,
    ) -> Result<Member, DomainError> {
        actor.require_admin()?;
        let mut member = self.load_member(actor, id).await?;

        if let Some(name) = input.name {
            member.name = name.trim().to_string();
        }
        if let Some(contact) = input.contact {
            member.contact = contact.trim().to_string();
        }
        if let Some(employee_id) = input.employee_id {
            let employee_id = employee_id.trim().to_string();
            if employee_id != member.employee_id {
                self.ensure_employee_id_free(&member.table_id, &employee_id, Some(member.id))
                    .await?;
                member.employee_id = employee_id;
            }
        }
        validator::Validate::validate(&member)?;

        self.member_repo.update(&member).await
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        actor.require_admin()?;
        let member = self.load_member(actor, id).await?;
        self.member_repo.delete(id).await?;
        info!("Member {} removed from table {}", member.employee_id, member.table_id);
        Ok(())
    }

    /// Ids outside the actor's group are skipped.
    pub async fn batch_delete(&self, actor: &Actor, ids: &[Uuid]) -> Result<u64, DomainError> {
        actor.require_admin()?;
        if ids.is_empty() {
            return Err(DomainError::ValidationError("No members selected".to_string()));
        }
        let deleted = self
            .member_repo
            .delete_many(ids, actor.group_scope().map(str::to_string))
            .await?;
        info!("{} members deleted by {}", deleted, actor.username);
        Ok(deleted)
    }

    pub async fn bind_card(
        &self,
        actor: &Actor,
        id: &Uuid,
        raw_card_id: &str,
    ) -> Result<Member, DomainError> {
        actor.require_admin()?;
        let card_id = normalize_card_id(raw_card_id)
            .ok_or_else(|| DomainError::ValidationError("Card id is required".to_string()))?;
        let mut member = self.load_member(actor, id).await?;

        if let Some(holder) = self.member_repo.find_by_card(&card_id).await? {
            if holder.id != member.id {
                warn!("Card {} already bound to member {}", card_id, holder.id);
                return Err(DomainError::CardAlreadyBound(card_id));
            }
        }

        member.bind_card(card_id);
        let updated = self.member_repo.update(&member).await?;
        info!("Card bound to member {}", updated.id);
        Ok(updated)
    }

    pub async fn unbind_card(&self, actor: &Actor, id: &Uuid) -> Result<Member, DomainError> {
        actor.require_admin()?;
        let mut member = self.load_member(actor, id).await?;
        member.unbind_card();
        let updated = self.member_repo.update(&member).await?;
        info!("Card unbound from member {}", updated.id);
        Ok(updated)
    }

    pub async fn find_by_card(&self, actor: &Actor, raw_card_id: &str) -> Result<Member, DomainError> {
        let card_id = normalize_card_id(raw_card_id)
            .ok_or_else(|| DomainError::ValidationError("Card id is required".to_string()))?;
        let member = self
            .member_repo
            .find_by_card(&card_id)
            .await?
            .ok_or_else(|| DomainError::CardNotBound(card_id.clone()))?;

        match load_table(self.table_repo.as_ref(), actor, &member.table_id).await {
            Ok(_) => Ok(member),
            Err(DomainError::TableNotFound) => Err(DomainError::CardNotBound(card_id)),
            Err(e) => Err(e),
        }
    }

    async fn load_member(&self, actor: &Actor, id: &Uuid) -> Result<Member, DomainError> {
        let member = self
            .member_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::MemberNotFound)?;
        match load_table(self.table_repo.as_ref(), actor, &member.table_id).await {
            Ok(_) => Ok(member),
            Err(DomainError::TableNotFound) => Err(DomainError::MemberNotFound),
            Err(e) => Err(e),
        }
    }

    async fn ensure_employee_id_free(
        &self,
        table_id: &Uuid,
        employee_id: &str,
        except: Option<Uuid>,
    ) -> Result<(), DomainError> {
        match self.member_repo.find_by_employee_id(table_id, employee_id).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(DomainError::EmployeeIdAlreadyExists(employee_id.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttendanceTable, User, UserRole};
    use crate::repositories::{MockMemberRepository, MockTableRepository};

    fn admin() -> Actor {
        let user = User::new(
            "a".to_string(),
            "h".to_string(),
            UserRole::Admin,
            Some("physics".to_string()),
            None,
        )
        .unwrap();
        Actor::from(&user)
    }

    fn tables_with(table: AttendanceTable) -> MockTableRepository {
        let mut tables = MockTableRepository::new();
        tables.expect_find_by_id().returning(move |_| Ok(Some(table.clone())));
        tables
    }

    fn physics_table() -> AttendanceTable {
        AttendanceTable::new("Lab".to_string(), None, "physics".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_duplicate_employee_id() {
        let table = physics_table();
        let table_id = table.id;
        let existing = Member::new(table_id, "Ada".to_string(), "E1".to_string(), None).unwrap();
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_employee_id()
            .returning(move |_, _| Ok(Some(existing.clone())));
        members.expect_create().never();
        let service = MemberService::new(Arc::new(members), Arc::new(tables_with(table)));

        let err = service
            .create(
                &admin(),
                CreateMember {
                    table_id,
                    name: "Bob".to_string(),
                    employee_id: " E1 ".to_string(),
                    contact: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmployeeIdAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_bind_card_conflict() {
        let table = physics_table();
        let ada = Member::new(table.id, "Ada".to_string(), "E1".to_string(), None).unwrap();
        let mut bob = Member::new(table.id, "Bob".to_string(), "E2".to_string(), None).unwrap();
        bob.bind_card("04A1".to_string());
        let ada_id = ada.id;

        let mut members = MockMemberRepository::new();
        members.expect_find_by_id().returning(move |_| Ok(Some(ada.clone())));
        members.expect_find_by_card().returning(move |_| Ok(Some(bob.clone())));
        members.expect_update().never();
        let service = MemberService::new(Arc::new(members), Arc::new(tables_with(table)));

        let err = service.bind_card(&admin(), &ada_id, "04a1\r\n").await.unwrap_err();
        assert!(matches!(err, DomainError::CardAlreadyBound(ref c) if c == "04A1"));
    }

    #[tokio::test]
    async fn test_bind_card_normalizes() {
        let table = physics_table();
        let ada = Member::new(table.id, "Ada".to_string(), "E1".to_string(), None).unwrap();
        let ada_id = ada.id;

        let mut members = MockMemberRepository::new();
        members.expect_find_by_id().returning(move |_| Ok(Some(ada.clone())));
        members
            .expect_find_by_card()
            .withf(|card| card == "DEADBEEF")
            .returning(|_| Ok(None));
        members.expect_update().returning(|m| Ok(m.clone()));
        let service = MemberService::new(Arc::new(members), Arc::new(tables_with(table)));

        let member = service.bind_card(&admin(), &ada_id, " deadbeef\n").await.unwrap();
        assert_eq!(member.card_id.as_deref(), Some("DEADBEEF"));
    }

    #[tokio::test]
    async fn test_find_by_card_in_foreign_group() {
        let table = AttendanceTable::new("Lab".to_string(), None, "chemistry".to_string()).unwrap();
        let mut ada = Member::new(table.id, "Ada".to_string(), "E1".to_string(), None).unwrap();
        ada.bind_card("CAFE".to_string());

        let mut members = MockMemberRepository::new();
        members.expect_find_by_card().returning(move |_| Ok(Some(ada.clone())));
        let service = MemberService::new(Arc::new(members), Arc::new(tables_with(table)));

        let err = service.find_by_card(&admin(), "cafe").await.unwrap_err();
        assert!(matches!(err, DomainError::CardNotBound(_)));
    }

    #[tokio::test]
    async fn test_batch_delete_scoped_to_group() {
        let mut members = MockMemberRepository::new();
        members
            .expect_delete_many()
            .withf(|ids, group| ids.len() == 2 && group.as_deref() == Some("physics"))
            .returning(|_, _| Ok(2));
        let service = MemberService::new(Arc::new(members), Arc::new(MockTableRepository::new()));

        let deleted = service
            .batch_delete(&admin(), &[Uuid::new_v4(), Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(deleted, 2);
    }
}
