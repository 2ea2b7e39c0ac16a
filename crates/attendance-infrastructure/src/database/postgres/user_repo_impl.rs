// ============================================================================
// Attendance Infrastructure - PostgreSQL User Repository
// File: crates/attendance-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use attendance_core::domain::{User, UserRole};
use attendance_core::error::DomainError;
use attendance_core::repositories::UserRepository;

use super::{db_error, unique_violation};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_super_admin: bool,
    pub user_group: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role: UserRole::from_str(&row.role).unwrap_or_default(),
            is_super_admin: row.is_super_admin,
            user_group: row.user_group,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, role, is_super_admin, user_group, \
                            created_by, created_at, updated_at";

fn write_error(user: &User, e: sqlx::Error) -> DomainError {
    match unique_violation(&e).as_deref() {
        Some("users_single_super_admin") => {
            warn!("Rejected second super administrator: {}", user.username);
            DomainError::SetupAlreadyCompleted
        }
        Some(_) => DomainError::UsernameAlreadyExists(user.username.clone()),
        None => db_error("writing user", e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("counting users", e))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding user by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding user by username", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing users", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        info!("Creating user: {}", user.username);

        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (
                id, username, password_hash, role, is_super_admin, user_group,
                created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_super_admin)
        .bind(&user.user_group)
        .bind(user.created_by)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(user, e))?;

        Ok(row.into())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET
                username = $2,
                password_hash = $3,
                role = $4,
                is_super_admin = $5,
                user_group = $6,
                updated_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_super_admin)
        .bind(&user.user_group)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(user, e))?;

        row.map(Into::into).ok_or(DomainError::UserNotFound)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deleting user", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1) AND NOT is_super_admin")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("batch deleting users", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("clearing users", e))?;

        warn!("Deleted all {} users", result.rows_affected());
        Ok(result.rows_affected())
    }
}
