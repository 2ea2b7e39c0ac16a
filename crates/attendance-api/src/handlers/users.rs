// ============================================================================
// Attendance API - User Management Handlers
// File: crates/attendance-api/src/handlers/users.rs
// ============================================================================
//! Super administrator user management

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use attendance_core::domain::{User, UserRole};
use attendance_core::services::{CreateUser, UpdateUser};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::CurrentUser;
use crate::response::{message_only, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"))]
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    pub user_group: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub role: Option<UserRole>,
    pub user_group: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteUsersRequest {
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResponse {
    pub deleted_count: u64,
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<User>>>> {
    let users = state.users.list(&actor).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /api/users/{id}
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.users.get(&actor, &id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<User>>)> {
    payload.validate()?;
    let user = state
        .users
        .create(
            &actor,
            CreateUser {
                username: payload.username,
                password: payload.password,
                role: payload.role,
                user_group: payload.user_group,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(user, "User created")),
    ))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .users
        .update(
            &actor,
            &id,
            UpdateUser {
                username: payload.username,
                role: payload.role,
                user_group: payload.user_group,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success_with_message(user, "User updated")))
}

/// PUT /api/users/{id}/password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state
        .users
        .change_password(&actor, &id, &payload.new_password)
        .await?;
    Ok(Json(message_only("Password changed")))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.users.delete(&actor, &id).await?;
    Ok(Json(message_only("User deleted")))
}

/// POST /api/users/batch-delete
pub async fn batch_delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(payload): ApiJson<BatchDeleteUsersRequest>,
) -> ApiResult<Json<ApiResponse<BatchDeleteResponse>>> {
    let deleted_count = state.users.batch_delete(&actor, &payload.user_ids).await?;
    Ok(Json(ApiResponse::success_with_message(
        BatchDeleteResponse { deleted_count },
        &format!("{} users deleted", deleted_count),
    )))
}
