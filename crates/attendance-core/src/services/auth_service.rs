// ============================================================================
// Attendance Core - Authentication Service
// File: crates/attendance-core/src/services/auth_service.rs
// ============================================================================
//! Setup probe, login, first-user bootstrap, and token authentication

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use attendance_security::jwt::{JwtError, JwtService, TokenSubject};
use attendance_security::password::PasswordService;
use attendance_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

use crate::domain::{Actor, User};
use crate::error::DomainError;
use crate::repositories::UserRepository;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { user_repo, jwt }
    }

    pub async fn check_setup(&self) -> Result<SetupStatus, DomainError> {
        let user_count = self.user_repo.count().await?;
        Ok(SetupStatus {
            has_users: user_count > 0,
            user_count,
            needs_setup: user_count == 0,
        })
    }

    /// Login with username and password
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, DomainError> {
        let username = username.trim();
        info!("Login attempt for user: {}", username);

        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown user: {}", username);
                DomainError::InvalidCredentials
            })?;

        let valid = PasswordService::verify(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            warn!("Login failed: wrong password for: {}", username);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        info!("Login successful for: {}", username);
        Ok(LoginResult { token, user })
    }

    /// Register the first account, which becomes the super administrator.
    /// Refused once any user exists.
    pub async fn register_first(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResult, DomainError> {
        if self.user_repo.count().await? > 0 {
            warn!("Registration refused: setup already completed");
            return Err(DomainError::SetupAlreadyCompleted);
        }

        check_password(password)?;
        let password_hash = PasswordService::hash(password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        let user = User::new_super_admin(username.to_string(), password_hash)?;

        // A concurrent bootstrap loses on the single-superadmin constraint
        let created = self.user_repo.create(&user).await?;
        let token = self.issue_token(&created)?;

        info!("Super administrator registered: {}", created.username);
        Ok(LoginResult { token, user: created })
    }

    /// Resolve a bearer token into the actor, re-reading the stored user.
    pub async fn authenticate(&self, token: &str) -> Result<Actor, DomainError> {
        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            JwtError::TokenExpired => DomainError::TokenExpired,
            other => DomainError::Unauthorized(other.to_string()),
        })?;
        let user_id = claims
            .user_id()
            .map_err(|e| DomainError::Unauthorized(e.to_string()))?;

        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("User no longer exists".to_string()))?;

        Ok(Actor::from(&user))
    }

    pub async fn current_user(&self, actor: &Actor) -> Result<User, DomainError> {
        self.user_repo
            .find_by_id(&actor.user_id)
            .await?
            .ok_or(DomainError::UserNotFound)
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.jwt
            .generate_token(&TokenSubject {
                user_id: user.id,
                username: &user.username,
                role: user.role.as_str(),
                is_super_admin: user.is_super_admin,
                user_group: &user.user_group,
            })
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))
    }
}

pub(crate) fn check_password(password: &str) -> Result<(), DomainError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(DomainError::PasswordTooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(DomainError::PasswordTooLong);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub has_users: bool,
    pub user_count: i64,
    pub needs_setup: bool,
}

/// Token plus the user it was issued for
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}
