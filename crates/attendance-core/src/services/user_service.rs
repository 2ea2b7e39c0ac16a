// ============================================================================
// Attendance Core - User Management Service
// File: crates/attendance-core/src/services/user_service.rs
// ============================================================================
//! Account management for super administrators

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use attendance_security::password::PasswordService;

use crate::domain::{Actor, User, UserRole};
use crate::error::DomainError;
use crate::repositories::UserRepository;

use super::auth_service::check_password;

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub user_group: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub role: Option<UserRole>,
    pub user_group: Option<String>,
}

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<User>, DomainError> {
        actor.require_super_admin()?;
        self.user_repo.list().await
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<User, DomainError> {
        actor.require_super_admin()?;
        self.find(id).await
    }

    pub async fn create(&self, actor: &Actor, input: CreateUser) -> Result<User, DomainError> {
        actor.require_super_admin()?;

        if input.role == UserRole::SuperAdmin {
            warn!("{} tried to create a super administrator", actor.username);
            return Err(DomainError::Forbidden(
                "Super administrator accounts cannot be created".to_string(),
            ));
        }
        check_password(&input.password)?;

        let username = input.username.trim().to_string();
        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(DomainError::UsernameAlreadyExists(username));
        }

        let password_hash = PasswordService::hash(&input.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        let user = User::new(
            username,
            password_hash,
            input.role,
            input.user_group,
            Some(actor.user_id),
        )?;

        let created = self.user_repo.create(&user).await?;
        info!("User {} created by {}", created.username, actor.username);
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &Uuid,
        input: UpdateUser,
    ) -> Result<User, DomainError> {
        actor.require_super_admin()?;
        if *id == actor.user_id {
            return Err(DomainError::SelfModification(
                "You cannot edit your own account here".to_string(),
            ));
        }

        let mut user = self.find(id).await?;
        if user.is_super_admin {
            return Err(DomainError::Forbidden(
                "Super administrator accounts cannot be edited".to_string(),
            ));
        }
        if input.role == Some(UserRole::SuperAdmin) {
            return Err(DomainError::Forbidden(
                "Users cannot be promoted to super administrator".to_string(),
            ));
        }

        if let Some(username) = input.username {
            let username = username.trim().to_string();
            if username != user.username {
                if self.user_repo.find_by_username(&username).await?.is_some() {
                    return Err(DomainError::UsernameAlreadyExists(username));
                }
                user.username = username;
            }
        }
        if let Some(role) = input.role {
            user.role = role;
        }
        if let Some(group) = input.user_group {
            let group = group.trim().to_string();
            if !group.is_empty() {
                user.user_group = group;
            }
        }
        validator::Validate::validate(&user)?;
        user.touch();

        let updated = self.user_repo.update(&user).await?;
        info!("User {} updated by {}", updated.username, actor.username);
        Ok(updated)
    }

    /// A super administrator's password may only be changed by that account.
    pub async fn change_password(
        &self,
        actor: &Actor,
        id: &Uuid,
        new_password: &str,
    ) -> Result<(), DomainError> {
        actor.require_super_admin()?;
        check_password(new_password)?;

        let mut user = self.find(id).await?;
        if user.is_super_admin && user.id != actor.user_id {
            return Err(DomainError::Forbidden(
                "Only the super administrator can change this password".to_string(),
            ));
        }

        let hash = PasswordService::hash(new_password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        user.set_password_hash(hash);
        self.user_repo.update(&user).await?;

        info!("Password changed for {} by {}", user.username, actor.username);
        Ok(())
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        actor.require_super_admin()?;
        if *id == actor.user_id {
            return Err(DomainError::SelfModification(
                "You cannot delete your own account".to_string(),
            ));
        }

        let user = self.find(id).await?;
        if user.is_super_admin {
            return Err(DomainError::Forbidden(
                "Super administrator accounts cannot be deleted".to_string(),
            ));
        }

        self.user_repo.delete(id).await?;
        info!("User {} deleted by {}", user.username, actor.username);
        Ok(())
    }

    pub async fn batch_delete(&self, actor: &Actor, ids: &[Uuid]) -> Result<u64, DomainError> {
        actor.require_super_admin()?;
        if ids.is_empty() {
            return Err(DomainError::ValidationError("No users selected".to_string()));
        }
        if ids.contains(&actor.user_id) {
            return Err(DomainError::SelfModification(
                "You cannot delete your own account".to_string(),
            ));
        }
        for id in ids {
            if let Some(user) = self.user_repo.find_by_id(id).await? {
                if user.is_super_admin {
                    return Err(DomainError::Forbidden(
                        "Super administrator accounts cannot be deleted".to_string(),
                    ));
                }
            }
        }

        let deleted = self.user_repo.delete_many(ids).await?;
        info!("{} users deleted by {}", deleted, actor.username);
        Ok(deleted)
    }

    async fn find(&self, id: &Uuid) -> Result<User, DomainError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound)
    }
}
