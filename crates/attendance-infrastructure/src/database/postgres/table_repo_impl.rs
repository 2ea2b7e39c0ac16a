// ============================================================================
// Attendance Infrastructure - PostgreSQL Table Repository
// File: crates/attendance-infrastructure/src/database/postgres/table_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use attendance_core::domain::{AttendanceTable, TableStatus, TableSummary};
use attendance_core::error::DomainError;
use attendance_core::repositories::TableRepository;

use super::db_error;

pub struct PgTableRepository {
    pool: PgPool,
}

impl PgTableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TableRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub user_group: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TableRow> for AttendanceTable {
    fn from(row: TableRow) -> Self {
        AttendanceTable {
            id: row.id,
            name: row.name,
            description: row.description,
            user_group: row.user_group,
            status: TableStatus::from_str(&row.status).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TableSummaryRow {
    #[sqlx(flatten)]
    pub table: TableRow,
    pub member_count: i64,
}

impl From<TableSummaryRow> for TableSummary {
    fn from(row: TableSummaryRow) -> Self {
        TableSummary {
            table: row.table.into(),
            member_count: row.member_count,
        }
    }
}

const SUMMARY_SELECT: &str = r#"
    SELECT
        t.id, t.name, t.description, t.user_group, t.status, t.created_at, t.updated_at,
        (SELECT COUNT(*) FROM members m WHERE m.table_id = t.id) AS member_count
    FROM attendance_tables t
"#;

#[async_trait]
impl TableRepository for PgTableRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AttendanceTable>, DomainError> {
        let row: Option<TableRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, user_group, status, created_at, updated_at
            FROM attendance_tables
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding table", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_summary(&self, id: &Uuid) -> Result<Option<TableSummary>, DomainError> {
        let row: Option<TableSummaryRow> =
            sqlx::query_as(&format!("{} WHERE t.id = $1", SUMMARY_SELECT))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding table summary", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, user_group: Option<String>) -> Result<Vec<TableSummary>, DomainError> {
        let rows: Vec<TableSummaryRow> = sqlx::query_as(&format!(
            "{} WHERE ($1::text IS NULL OR t.user_group = $1) ORDER BY t.created_at DESC",
            SUMMARY_SELECT
        ))
        .bind(user_group)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing tables", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, table: &AttendanceTable) -> Result<AttendanceTable, DomainError> {
        let row: TableRow = sqlx::query_as(
            r#"
            INSERT INTO attendance_tables (
                id, name, description, user_group, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, user_group, status, created_at, updated_at
            "#,
        )
        .bind(table.id)
        .bind(&table.name)
        .bind(&table.description)
        .bind(&table.user_group)
        .bind(table.status.as_str())
        .bind(table.created_at)
        .bind(table.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating table", e))?;

        info!("Table created: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, table: &AttendanceTable) -> Result<AttendanceTable, DomainError> {
        let row: Option<TableRow> = sqlx::query_as(
            r#"
            UPDATE attendance_tables
            SET name = $2, description = $3, status = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, name, description, user_group, status, created_at, updated_at
            "#,
        )
        .bind(table.id)
        .bind(&table.name)
        .bind(&table.description)
        .bind(table.status.as_str())
        .bind(table.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating table", e))?;

        row.map(Into::into).ok_or(DomainError::TableNotFound)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        // Members and records go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM attendance_tables WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deleting table", e))?;

        Ok(result.rows_affected() > 0)
    }
}
