// ============================================================================
// Attendance API - Member Handlers
// File: crates/attendance-api/src/handlers/members.rs
// ============================================================================
//! Member CRUD and card binding

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use attendance_core::domain::Member;
use attendance_core::services::{CreateMember, UpdateMember};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{AdminUser, CurrentUser};
use crate::response::{message_only, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListQuery {
    pub table_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub table_id: Uuid,
    pub name: String,
    pub employee_id: String,
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub employee_id: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindCardRequest {
    pub card_id: String,
}

/// GET /api/members
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(query): ApiQuery<MemberListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Member>>>> {
    let members = state.members.list(&actor, query.table_id).await?;
    Ok(Json(ApiResponse::success(members)))
}

/// POST /api/members
pub async fn create(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiJson(payload): ApiJson<CreateMemberRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Member>>)> {
    let member = state
        .members
        .create(
            &actor,
            CreateMember {
                table_id: payload.table_id,
                name: payload.name,
                employee_id: payload.employee_id,
                contact: payload.contact,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(member, "Member added")),
    ))
}

/// PUT /api/members/{id}
pub async fn update(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateMemberRequest>,
) -> ApiResult<Json<ApiResponse<Member>>> {
    let member = state
        .members
        .update(
            &actor,
            &id,
            UpdateMember {
                name: payload.name,
                employee_id: payload.employee_id,
                contact: payload.contact,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success_with_message(member, "Member updated")))
}

/// DELETE /api/members/{id}
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.members.delete(&actor, &id).await?;
    Ok(Json(message_only("Member deleted")))
}

/// POST /api/members/batch-delete
pub async fn batch_delete(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiJson(payload): ApiJson<BatchDeleteRequest>,
) -> ApiResult<Json<ApiResponse<BatchDeleteResponse>>> {
    let deleted_count = state.members.batch_delete(&actor, &payload.ids).await?;
    Ok(Json(ApiResponse::success_with_message(
        BatchDeleteResponse { deleted_count },
        &format!("{} members deleted", deleted_count),
    )))
}

/// PUT /api/members/{id}/bind-card
pub async fn bind_card(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BindCardRequest>,
) -> ApiResult<Json<ApiResponse<Member>>> {
    let member = state.members.bind_card(&actor, &id, &payload.card_id).await?;
    Ok(Json(ApiResponse::success_with_message(member, "Card bound")))
}

/// PUT /api/members/{id}/unbind-card
pub async fn unbind_card(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Member>>> {
    let member = state.members.unbind_card(&actor, &id).await?;
    Ok(Json(ApiResponse::success_with_message(member, "Card unbound")))
}

/// GET /api/members/by-card/{card_id}
pub async fn by_card(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(card_id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<Member>>> {
    let member = state.members.find_by_card(&actor, &card_id).await?;
    Ok(Json(ApiResponse::success(member)))
}
