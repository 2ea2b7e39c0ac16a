// ============================================================================
// Attendance Infrastructure - PostgreSQL Member Repository
// File: crates/attendance-infrastructure/src/database/postgres/member_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use attendance_core::domain::Member;
use attendance_core::error::DomainError;
use attendance_core::repositories::{MemberFilter, MemberRepository};

use super::{db_error, unique_violation};

pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    pub id: Uuid,
    pub table_id: Uuid,
    pub name: String,
    pub employee_id: String,
    pub contact: String,
    pub card_id: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            table_id: row.table_id,
            name: row.name,
            employee_id: row.employee_id,
            contact: row.contact,
            card_id: row.card_id,
            joined_at: row.joined_at,
            created_at: row.created_at,
        }
    }
}

fn write_error(member: &Member, e: sqlx::Error) -> DomainError {
    match unique_violation(&e).as_deref() {
        Some("members_card_id_key") => {
            DomainError::CardAlreadyBound(member.card_id.clone().unwrap_or_default())
        }
        Some(_) => DomainError::EmployeeIdAlreadyExists(member.employee_id.clone()),
        None => db_error("writing member", e),
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(
            r#"
            SELECT id, table_id, name, employee_id, contact, card_id, joined_at, created_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding member", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_card(&self, card_id: &str) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(
            r#"
            SELECT id, table_id, name, employee_id, contact, card_id, joined_at, created_at
            FROM members
            WHERE card_id = $1
            "#,
        )
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding member by card", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_employee_id(
        &self,
        table_id: &Uuid,
        employee_id: &str,
    ) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(
            r#"
            SELECT id, table_id, name, employee_id, contact, card_id, joined_at, created_at
            FROM members
            WHERE table_id = $1 AND employee_id = $2
            "#,
        )
        .bind(table_id)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding member by employee id", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: &MemberFilter) -> Result<Vec<Member>, DomainError> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            r#"
            SELECT
                m.id, m.table_id, m.name, m.employee_id, m.contact, m.card_id,
                m.joined_at, m.created_at
            FROM members m
            JOIN attendance_tables t ON t.id = m.table_id
            WHERE ($1::uuid IS NULL OR m.table_id = $1)
              AND ($2::text IS NULL OR t.user_group = $2)
            ORDER BY m.joined_at DESC
            "#,
        )
        .bind(filter.table_id)
        .bind(&filter.user_group)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing members", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, member: &Member) -> Result<Member, DomainError> {
        let row: MemberRow = sqlx::query_as(
            r#"
            INSERT INTO members (
                id, table_id, name, employee_id, contact, card_id, joined_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, table_id, name, employee_id, contact, card_id, joined_at, created_at
            "#,
        )
        .bind(member.id)
        .bind(member.table_id)
        .bind(&member.name)
        .bind(&member.employee_id)
        .bind(&member.contact)
        .bind(&member.card_id)
        .bind(member.joined_at)
        .bind(member.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(member, e))?;

        info!("Member created: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, member: &Member) -> Result<Member, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(
            r#"
            UPDATE members
            SET name = $2, employee_id = $3, contact = $4, card_id = $5
            WHERE id = $1
            RETURNING id, table_id, name, employee_id, contact, card_id, joined_at, created_at
            "#,
        )
        .bind(member.id)
        .bind(&member.name)
        .bind(&member.employee_id)
        .bind(&member.contact)
        .bind(&member.card_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(member, e))?;

        row.map(Into::into).ok_or(DomainError::MemberNotFound)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deleting member", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(
        &self,
        ids: &[Uuid],
        user_group: Option<String>,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM members m
            USING attendance_tables t
            WHERE m.table_id = t.id
              AND m.id = ANY($1)
              AND ($2::text IS NULL OR t.user_group = $2)
            "#,
        )
        .bind(ids)
        .bind(user_group)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("batch deleting members", e))?;

        Ok(result.rows_affected())
    }
}
