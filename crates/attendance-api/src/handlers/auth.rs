// ============================================================================
// Attendance API - Auth Handlers
// File: crates/attendance-api/src/handlers/auth.rs
// ============================================================================
//! Setup probe, login, first-user registration, current user

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

use attendance_core::domain::User;
use attendance_core::services::{LoginResult, SetupStatus};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// First-user registration payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"))]
    pub username: String,
    pub password: String,
}

/// GET /api/auth/check-setup
pub async fn check_setup(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<SetupStatus>>> {
    let status = state.auth.check_setup().await?;
    Ok(Json(ApiResponse::success(status)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResult>>> {
    payload.validate()?;
    let result = state.auth.login(&payload.username, &payload.password).await?;
    Ok(Json(ApiResponse::success_with_message(result, "Login successful")))
}

/// POST /api/auth/register, only while no user exists
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LoginResult>>)> {
    payload.validate()?;
    let result = state
        .auth
        .register_first(payload.username.trim(), &payload.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            result,
            "Super administrator account created",
        )),
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.auth.current_user(&actor).await?;
    Ok(Json(ApiResponse::success(user)))
}
