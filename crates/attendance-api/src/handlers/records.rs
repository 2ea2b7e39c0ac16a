// ============================================================================
// Attendance API - Record Handlers
// File: crates/attendance-api/src/handlers/records.rs
// ============================================================================
//! Record listing, manual entry, edits, and card check-in

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use attendance_core::domain::record::{format_date, format_time, parse_date, parse_time};
use attendance_core::domain::{Record, RecordPatch, RecordStatus, RecordType, RecordView};
use attendance_core::services::{CardCheckin, CardCheckinResult, ManualRecord, RecordQuery};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::CurrentUser;
use crate::response::{message_only, ApiResponse};
use crate::state::AppState;

/// Record as sent to clients: dates `YYYY-MM-DD`, times `HH:MM`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDto {
    pub id: Uuid,
    pub table_id: Uuid,
    pub member_id: Uuid,
    pub checkin_date: Option<String>,
    pub checkin_time: Option<String>,
    pub checkout_date: Option<String>,
    pub checkout_time: Option<String>,
    pub status: RecordStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_employee_id: Option<String>,
}

impl From<Record> for RecordDto {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            table_id: record.table_id,
            member_id: record.member_id,
            checkin_date: record.checkin_date.map(format_date),
            checkin_time: record.checkin_time.map(format_time),
            checkout_date: record.checkout_date.map(format_date),
            checkout_time: record.checkout_time.map(format_time),
            status: record.status,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
            member_name: None,
            member_employee_id: None,
        }
    }
}

impl From<RecordView> for RecordDto {
    fn from(view: RecordView) -> Self {
        Self {
            member_name: Some(view.member_name),
            member_employee_id: Some(view.member_employee_id),
            ..view.record.into()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListQuery {
    pub table_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualRecordRequest {
    pub table_id: Uuid,
    pub member_id: Uuid,
    pub record_type: RecordType,
    pub date: String,
    pub time: String,
}

/// Absent fields stay untouched; `null` or `""` clears.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    #[serde(default, deserialize_with = "present")]
    pub checkin_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub checkin_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub checkout_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub checkout_time: Option<Option<String>>,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(d).map(Some)
}

impl UpdateRecordRequest {
    fn into_patch(self) -> Result<RecordPatch, ApiError> {
        fn field<T>(
            value: Option<Option<String>>,
            parse: fn(&str) -> Result<T, attendance_core::DomainError>,
        ) -> Result<Option<Option<T>>, ApiError> {
            match value {
                None => Ok(None),
                Some(None) => Ok(Some(None)),
                Some(Some(s)) if s.trim().is_empty() => Ok(Some(None)),
                Some(Some(s)) => Ok(Some(Some(parse(&s)?))),
            }
        }

        Ok(RecordPatch {
            checkin_date: field(self.checkin_date, parse_date)?,
            checkin_time: field(self.checkin_time, parse_time)?,
            checkout_date: field(self.checkout_date, parse_date)?,
            checkout_time: field(self.checkout_time, parse_time)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCheckinRequest {
    pub card_id: String,
    pub table_id: Uuid,
    pub record_type: RecordType,
}

/// GET /api/records
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(query): ApiQuery<RecordListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<RecordDto>>>> {
    let date = query
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(parse_date)
        .transpose()?;
    let records = state
        .records
        .list(
            &actor,
            RecordQuery {
                table_id: query.table_id,
                member_id: query.member_id,
                date,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(
        records.into_iter().map(RecordDto::from).collect(),
    )))
}

/// POST /api/records
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(payload): ApiJson<ManualRecordRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RecordDto>>)> {
    let record = state
        .records
        .upsert(
            &actor,
            ManualRecord {
                table_id: payload.table_id,
                member_id: payload.member_id,
                record_type: payload.record_type,
                date: parse_date(&payload.date)?,
                time: parse_time(&payload.time)?,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(record.into(), "Record saved")),
    ))
}

/// PUT /api/records/{id}
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateRecordRequest>,
) -> ApiResult<Json<ApiResponse<RecordDto>>> {
    let patch = payload.into_patch()?;
    let record = state.records.update(&actor, &id, patch).await?;
    Ok(Json(ApiResponse::success_with_message(record.into(), "Record updated")))
}

/// DELETE /api/records/{id}
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.records.delete(&actor, &id).await?;
    Ok(Json(message_only("Record deleted")))
}

/// POST /api/records/card-checkin
pub async fn card_checkin(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(payload): ApiJson<CardCheckinRequest>,
) -> ApiResult<Json<ApiResponse<CardCheckinResult>>> {
    let result = state
        .records
        .card_checkin(
            &actor,
            CardCheckin {
                card_id: payload.card_id,
                table_id: payload.table_id,
                record_type: payload.record_type,
            },
        )
        .await?;
    let message = match result.record_type {
        RecordType::CheckIn => format!("{} checked in at {}", result.member_name, format_time(result.time)),
        RecordType::CheckOut => format!("{} checked out at {}", result.member_name, format_time(result.time)),
    };
    Ok(Json(ApiResponse::success_with_message(result, &message)))
}
