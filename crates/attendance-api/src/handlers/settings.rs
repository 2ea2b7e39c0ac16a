//! Card reader settings for the caller's group

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use attendance_core::domain::{RecordType, Settings};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::middleware::{AdminUser, CurrentUser};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDto {
    pub active_table: Option<Uuid>,
    pub mode: Option<RecordType>,
}

impl From<Settings> for SettingsDto {
    fn from(settings: Settings) -> Self {
        Self {
            active_table: settings.active_table,
            mode: settings.mode,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTableRequest {
    pub table_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: RecordType,
}

/// GET /api/settings
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<SettingsDto>>> {
    let settings = state.settings.get(&actor).await?;
    Ok(Json(ApiResponse::success(settings.into())))
}

/// PUT /api/settings/active-table
pub async fn set_active_table(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiJson(payload): ApiJson<ActiveTableRequest>,
) -> ApiResult<Json<ApiResponse<SettingsDto>>> {
    let settings = state.settings.set_active_table(&actor, &payload.table_id).await?;
    Ok(Json(ApiResponse::success_with_message(
        settings.into(),
        "Active table updated",
    )))
}

/// PUT /api/settings/mode
pub async fn set_mode(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiJson(payload): ApiJson<ModeRequest>,
) -> ApiResult<Json<ApiResponse<SettingsDto>>> {
    let settings = state.settings.set_mode(&actor, payload.mode).await?;
    Ok(Json(ApiResponse::success_with_message(settings.into(), "Mode updated")))
}
