// ============================================================================
// Attendance Infrastructure - PostgreSQL Record Repository
// File: crates/attendance-infrastructure/src/database/postgres/record_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use attendance_core::domain::{Record, RecordStatus, RecordView};
use attendance_core::error::DomainError;
use attendance_core::repositories::{RecordFilter, RecordRepository};

use super::{db_error, unique_violation};

pub struct PgRecordRepository {
    pool: PgPool,
}

impl PgRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    pub id: Uuid,
    pub table_id: Uuid,
    pub member_id: Uuid,
    pub checkin_date: Option<NaiveDate>,
    pub checkin_time: Option<NaiveTime>,
    pub checkout_date: Option<NaiveDate>,
    pub checkout_time: Option<NaiveTime>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        let mut record = Record {
            id: row.id,
            table_id: row.table_id,
            member_id: row.member_id,
            checkin_date: row.checkin_date,
            checkin_time: row.checkin_time,
            checkout_date: row.checkout_date,
            checkout_time: row.checkout_time,
            status: RecordStatus::from_str(&row.status).unwrap_or(RecordStatus::Pending),
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        record.status = record.derive_status();
        record
    }
}

#[derive(Debug, FromRow)]
struct RecordViewRow {
    #[sqlx(flatten)]
    pub record: RecordRow,
    pub member_name: String,
    pub member_employee_id: String,
}

impl From<RecordViewRow> for RecordView {
    fn from(row: RecordViewRow) -> Self {
        RecordView {
            record: row.record.into(),
            member_name: row.member_name,
            member_employee_id: row.member_employee_id,
        }
    }
}

const RECORD_COLUMNS: &str = "id, table_id, member_id, checkin_date, checkin_time, \
                              checkout_date, checkout_time, status, created_at, updated_at";

fn write_error(e: sqlx::Error) -> DomainError {
    match unique_violation(&e) {
        Some(_) => DomainError::RecordAlreadyExists,
        None => db_error("writing record", e),
    }
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Record>, DomainError> {
        let row: Option<RecordRow> =
            sqlx::query_as(&format!("SELECT {} FROM records WHERE id = $1", RECORD_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding record", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_for_day(
        &self,
        table_id: &Uuid,
        member_id: &Uuid,
        date: NaiveDate,
    ) -> Result<Option<Record>, DomainError> {
        let row: Option<RecordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM records WHERE table_id = $1 AND member_id = $2 AND record_date = $3",
            RECORD_COLUMNS
        ))
        .bind(table_id)
        .bind(member_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding record for day", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<RecordView>, DomainError> {
        let rows: Vec<RecordViewRow> = sqlx::query_as(
            r#"
            SELECT
                r.id, r.table_id, r.member_id, r.checkin_date, r.checkin_time,
                r.checkout_date, r.checkout_time, r.status, r.created_at, r.updated_at,
                m.name AS member_name, m.employee_id AS member_employee_id
            FROM records r
            JOIN members m ON m.id = r.member_id
            JOIN attendance_tables t ON t.id = r.table_id
            WHERE ($1::uuid IS NULL OR r.table_id = $1)
              AND ($2::uuid IS NULL OR r.member_id = $2)
              AND ($3::date IS NULL OR r.checkin_date = $3 OR r.checkout_date = $3)
              AND ($4::text IS NULL OR t.user_group = $4)
            ORDER BY r.checkin_date DESC NULLS LAST, r.created_at DESC
            "#,
        )
        .bind(filter.table_id)
        .bind(filter.member_id)
        .bind(filter.date)
        .bind(&filter.user_group)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing records", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_table(&self, table_id: &Uuid) -> Result<Vec<Record>, DomainError> {
        let rows: Vec<RecordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM records WHERE table_id = $1 ORDER BY record_date, checkin_time",
            RECORD_COLUMNS
        ))
        .bind(table_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing table records", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, record: &Record) -> Result<Record, DomainError> {
        let row: RecordRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO records (
                id, table_id, member_id, checkin_date, checkin_time,
                checkout_date, checkout_time, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(record.id)
        .bind(record.table_id)
        .bind(record.member_id)
        .bind(record.checkin_date)
        .bind(record.checkin_time)
        .bind(record.checkout_date)
        .bind(record.checkout_time)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(row.into())
    }

    async fn update(&self, record: &Record) -> Result<Record, DomainError> {
        let row: Option<RecordRow> = sqlx::query_as(&format!(
            r#"
            UPDATE records
            SET
                checkin_date = $2,
                checkin_time = $3,
                checkout_date = $4,
                checkout_time = $5,
                status = $6,
                updated_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(record.id)
        .bind(record.checkin_date)
        .bind(record.checkin_time)
        .bind(record.checkout_date)
        .bind(record.checkout_time)
        .bind(record.status.as_str())
        .bind(record.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;

        row.map(Into::into).ok_or(DomainError::RecordNotFound)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deleting record", e))?;

        Ok(result.rows_affected() > 0)
    }
}
