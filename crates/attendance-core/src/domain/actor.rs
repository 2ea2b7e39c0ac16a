//! The authenticated caller of a service operation

use uuid::Uuid;

use super::user::{User, UserRole};
use crate::error::DomainError;

/// Who is performing an operation. Built from the stored user on every
/// request, so role changes take effect without re-issuing tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub is_super_admin: bool,
    pub user_group: String,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Both the role and the flag must agree.
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin && self.role == UserRole::SuperAdmin
    }

    pub fn can_access_group(&self, user_group: &str) -> bool {
        self.is_super_admin() || self.user_group == user_group
    }

    /// Group filter for list queries: `None` means every group.
    pub fn group_scope(&self) -> Option<&str> {
        if self.is_super_admin() {
            None
        } else {
            Some(&self.user_group)
        }
    }

    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("Administrator permission required".to_string()))
        }
    }

    pub fn require_super_admin(&self) -> Result<(), DomainError> {
        if self.is_super_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("Super administrator permission required".to_string()))
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            is_super_admin: user.is_super_admin,
            user_group: user.user_group.clone(),
        }
    }
}
