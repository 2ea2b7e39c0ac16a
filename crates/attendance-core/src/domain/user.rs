// ============================================================================
// Attendance Core - User Entity
// File: crates/attendance-core/src/domain/user.rs
// Description: Dashboard account with role and owning user group
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use attendance_shared::constants::DEFAULT_USER_GROUP;

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "superadmin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            "superadmin" => Some(UserRole::SuperAdmin),
            _ => None,
        }
    }

    /// Admin and superadmin may manage tables, members and settings.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[validate(length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"))]
    pub username: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,
    pub is_super_admin: bool,

    #[validate(length(min = 1, max = 100, message = "User group must be between 1 and 100 characters"))]
    pub user_group: String,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        password_hash: String,
        role: UserRole,
        user_group: Option<String>,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let user = Self {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            password_hash,
            role,
            is_super_admin: false,
            user_group: user_group
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| DEFAULT_USER_GROUP.to_string()),
            created_by,
            created_at: now,
            updated_at: now,
        };

        user.validate()?;
        Ok(user)
    }

    /// The bootstrap account created by the first registration.
    pub fn new_super_admin(
        username: String,
        password_hash: String,
    ) -> Result<Self, validator::ValidationErrors> {
        let mut user = Self::new(username, password_hash, UserRole::SuperAdmin, None, None)?;
        user.is_super_admin = true;
        Ok(user)
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
