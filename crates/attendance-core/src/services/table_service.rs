// ============================================================================
// Attendance Core - Table Service
// File: crates/attendance-core/src/services/table_service.rs
// ============================================================================
//! Attendance tables (rosters) scoped to user groups, plus export

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;
use uuid::Uuid;

use crate::domain::{Actor, AttendanceTable, RecordStatus, TableStatus, TableSummary};
use crate::error::DomainError;
use crate::repositories::{MemberFilter, MemberRepository, RecordRepository, TableRepository};

#[derive(Debug, Clone)]
pub struct CreateTable {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTable {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TableStatus>,
}

/// One line of a table export. Members without records get a single row
/// with no date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub member_name: String,
    pub employee_id: String,
    pub contact: String,
    pub card_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub checkin_time: Option<NaiveTime>,
    pub checkout_time: Option<NaiveTime>,
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Clone)]
pub struct TableExport {
    pub table: AttendanceTable,
    pub rows: Vec<ExportRow>,
}

pub struct TableService {
    table_repo: Arc<dyn TableRepository>,
    member_repo: Arc<dyn MemberRepository>,
    record_repo: Arc<dyn RecordRepository>,
}

impl TableService {
    pub fn new(
        table_repo: Arc<dyn TableRepository>,
        member_repo: Arc<dyn MemberRepository>,
        record_repo: Arc<dyn RecordRepository>,
    ) -> Self {
        Self {
            table_repo,
            member_repo,
            record_repo,
        }
    }

    /// Super administrators may filter by any group; everyone else only
    /// sees their own.
    pub async fn list(
        &self,
        actor: &Actor,
        user_group: Option<String>,
    ) -> Result<Vec<TableSummary>, DomainError> {
        let scope = if actor.is_super_admin() {
            user_group.filter(|g| !g.trim().is_empty())
        } else {
            Some(actor.user_group.clone())
        };
        self.table_repo.list(scope).await
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<TableSummary, DomainError> {
        let summary = self
            .table_repo
            .find_summary(id)
            .await?
            .ok_or(DomainError::TableNotFound)?;
        if !actor.can_access_group(&summary.table.user_group) {
            return Err(DomainError::TableNotFound);
        }
        Ok(summary)
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateTable,
    ) -> Result<TableSummary, DomainError> {
        actor.require_admin()?;
        let table = AttendanceTable::new(input.name, input.description, actor.user_group.clone())?;
        let created = self.table_repo.create(&table).await?;
        info!("Table '{}' created in group {}", created.name, created.user_group);
        Ok(TableSummary {
            table: created,
            member_count: 0,
        })
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &Uuid,
        input: UpdateTable,
    ) -> Result<TableSummary, DomainError> {
        actor.require_admin()?;
        let mut table = load_table(self.table_repo.as_ref(), actor, id).await?;

        if let Some(name) = input.name {
            table.rename(name)?;
        }
        if let Some(description) = input.description {
            table.description = description.trim().to_string();
        }
        if let Some(status) = input.status {
            table.status = status;
        }
        validator::Validate::validate(&table)?;
        table.touch();

        self.table_repo.update(&table).await?;
        info!("Table {} updated", table.id);
        self.get(actor, id).await
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        actor.require_admin()?;
        let table = load_table(self.table_repo.as_ref(), actor, id).await?;
        self.table_repo.delete(id).await?;
        info!("Table '{}' deleted with its members and records", table.name);
        Ok(())
    }

    /// Every record of the table, oldest day first, then each member that
    /// has no record at all.
    pub async fn export(&self, actor: &Actor, id: &Uuid) -> Result<TableExport, DomainError> {
        let table = load_table(self.table_repo.as_ref(), actor, id).await?;
        let mut members = self
            .member_repo
            .list(&MemberFilter {
                table_id: Some(table.id),
                user_group: None,
            })
            .await?;
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));

        let mut records = self.record_repo.list_by_table(&table.id).await?;
        records.sort_by(|a, b| {
            a.record_date()
                .cmp(&b.record_date())
                .then(a.checkin_time.cmp(&b.checkin_time))
        });

        let by_id: HashMap<Uuid, usize> =
            members.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
        let mut has_record = vec![false; members.len()];
        let mut rows = Vec::with_capacity(records.len() + members.len());

        for record in &records {
            let Some(&index) = by_id.get(&record.member_id) else {
                continue;
            };
            has_record[index] = true;
            let member = &members[index];
            rows.push(ExportRow {
                member_name: member.name.clone(),
                employee_id: member.employee_id.clone(),
                contact: member.contact.clone(),
                card_id: member.card_id.clone(),
                date: record.record_date(),
                checkin_time: record.checkin_time,
                checkout_time: record.checkout_time,
                status: Some(record.status),
            });
        }

        for (member, _) in members.iter().zip(&has_record).filter(|(_, seen)| !**seen) {
            rows.push(ExportRow {
                member_name: member.name.clone(),
                employee_id: member.employee_id.clone(),
                contact: member.contact.clone(),
                card_id: member.card_id.clone(),
                date: None,
                checkin_time: None,
                checkout_time: None,
                status: None,
            });
        }

        info!("Exported {} rows from table '{}'", rows.len(), table.name);
        Ok(TableExport { table, rows })
    }
}

/// Fetch a table the actor may see; foreign tables look missing.
pub(crate) async fn load_table(
    table_repo: &dyn TableRepository,
    actor: &Actor,
    id: &Uuid,
) -> Result<AttendanceTable, DomainError> {
    let table = table_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::TableNotFound)?;
    if !actor.can_access_group(&table.user_group) {
        return Err(DomainError::TableNotFound);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Member, Record, RecordType, User, UserRole};
    use crate::repositories::{MockMemberRepository, MockRecordRepository, MockTableRepository};

    fn actor(role: UserRole, group: &str) -> Actor {
        let user = User::new("u".to_string(), "h".to_string(), role, Some(group.to_string()), None)
            .unwrap();
        Actor::from(&user)
    }

    fn service(tables: MockTableRepository) -> TableService {
        service_with(tables, MockMemberRepository::new(), MockRecordRepository::new())
    }

    fn service_with(
        tables: MockTableRepository,
        members: MockMemberRepository,
        records: MockRecordRepository,
    ) -> TableService {
        TableService::new(Arc::new(tables), Arc::new(members), Arc::new(records))
    }

    #[tokio::test]
    async fn test_list_forces_own_group() {
        let mut tables = MockTableRepository::new();
        tables
            .expect_list()
            .withf(|scope| scope.as_deref() == Some("physics"))
            .returning(|_| Ok(vec![]));

        service(tables)
            .list(&actor(UserRole::Admin, "physics"), Some("chemistry".to_string()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let err = service(MockTableRepository::new())
            .create(
                &actor(UserRole::User, "physics"),
                CreateTable {
                    name: "Lab".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_uses_actor_group() {
        let mut tables = MockTableRepository::new();
        tables.expect_create().returning(|t| Ok(t.clone()));

        let summary = service(tables)
            .create(
                &actor(UserRole::Admin, "physics"),
                CreateTable {
                    name: "Lab".to_string(),
                    description: Some("Tuesday".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(summary.table.user_group, "physics");
        assert_eq!(summary.member_count, 0);
    }

    #[tokio::test]
    async fn test_foreign_table_is_not_found() {
        let table = AttendanceTable::new("Lab".to_string(), None, "chemistry".to_string()).unwrap();
        let id = table.id;
        let mut tables = MockTableRepository::new();
        tables.expect_find_by_id().returning(move |_| Ok(Some(table.clone())));
        tables.expect_delete().never();

        let err = service(tables)
            .delete(&actor(UserRole::Admin, "physics"), &id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TableNotFound));
    }

    #[tokio::test]
    async fn test_export_adds_placeholder_rows() {
        let table = AttendanceTable::new("Lab".to_string(), None, "physics".to_string()).unwrap();
        let table_id = table.id;
        let ada = Member::new(table_id, "Ada".to_string(), "1".to_string(), None).unwrap();
        let bob = Member::new(table_id, "Bob".to_string(), "2".to_string(), None).unwrap();
        let record = Record::new(
            table_id,
            ada.id,
            RecordType::CheckIn,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );

        let mut tables = MockTableRepository::new();
        tables.expect_find_by_id().returning(move |_| Ok(Some(table.clone())));
        let mut members = MockMemberRepository::new();
        let roster = vec![ada, bob];
        members.expect_list().returning(move |_| Ok(roster.clone()));
        let mut records = MockRecordRepository::new();
        records.expect_list_by_table().returning(move |_| Ok(vec![record.clone()]));

        let export = service_with(tables, members, records)
            .export(&actor(UserRole::User, "physics"), &table_id)
            .await
            .unwrap();

        assert_eq!(export.rows.len(), 2);
        assert_eq!(export.rows[0].member_name, "Ada");
        assert_eq!(export.rows[0].status, Some(RecordStatus::CheckedIn));
        assert_eq!(export.rows[1].member_name, "Bob");
        assert_eq!(export.rows[1].date, None);
    }
}
