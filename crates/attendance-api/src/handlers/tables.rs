// ============================================================================
// Attendance API - Table Handlers
// File: crates/attendance-api/src/handlers/tables.rs
// ============================================================================
//! Attendance table CRUD and CSV export

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use uuid::Uuid;

use attendance_core::domain::record::{format_date, format_time};
use attendance_core::domain::{TableStatus, TableSummary};
use attendance_core::services::{CreateTable, TableExport, UpdateTable};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{AdminUser, CurrentUser};
use crate::response::{message_only, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableListQuery {
    pub user_group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTableRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TableStatus>,
}

/// GET /api/tables
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(query): ApiQuery<TableListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<TableSummary>>>> {
    let tables = state.tables.list(&actor, query.user_group).await?;
    Ok(Json(ApiResponse::success(tables)))
}

/// POST /api/tables
pub async fn create(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiJson(payload): ApiJson<CreateTableRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TableSummary>>)> {
    let table = state
        .tables
        .create(
            &actor,
            CreateTable {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(table, "Table created")),
    ))
}

/// GET /api/tables/{id}
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<TableSummary>>> {
    let table = state.tables.get(&actor, &id).await?;
    Ok(Json(ApiResponse::success(table)))
}

/// PUT /api/tables/{id}
pub async fn update(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateTableRequest>,
) -> ApiResult<Json<ApiResponse<TableSummary>>> {
    let table = state
        .tables
        .update(
            &actor,
            &id,
            UpdateTable {
                name: payload.name,
                description: payload.description,
                status: payload.status,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success_with_message(table, "Table updated")))
}

/// DELETE /api/tables/{id}
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.tables.delete(&actor, &id).await?;
    Ok(Json(message_only("Table deleted")))
}

/// GET /api/tables/{id}/export
pub async fn export(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    let export = state.tables.export(&actor, &id).await?;
    let body = render_csv(&export)?;
    let filename = export_filename(&export.table.name, &format_date(Local::now().date_naive()));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        body,
    )
        .into_response())
}

const CSV_HEADER: [&str; 8] = [
    "Name",
    "Employee ID",
    "Contact",
    "Card ID",
    "Date",
    "Check-in",
    "Check-out",
    "Status",
];

/// UTF-8 with a byte order mark so spreadsheet tools detect the encoding.
fn render_csv(export: &TableExport) -> Result<Vec<u8>, ApiError> {
    let mut writer = csv::Writer::from_writer("\u{FEFF}".as_bytes().to_vec());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    for row in &export.rows {
        writer
            .write_record([
                row.member_name.clone(),
                row.employee_id.clone(),
                row.contact.clone(),
                row.card_id.clone().unwrap_or_default(),
                row.date.map(format_date).unwrap_or_default(),
                row.checkin_time.map(format_time).unwrap_or_default(),
                row.checkout_time.map(format_time).unwrap_or_default(),
                row.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            ])
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::InternalError(e.to_string()))
}

/// `<table>_<date>.csv` with characters unsafe in a header replaced.
fn export_filename(table_name: &str, date: &str) -> String {
    let safe: String = table_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}_{}.csv", safe, date)
}

/// RFC 5987 `attr-char` minus the characters `export_filename` never emits.
const FILENAME_ATTR: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// ASCII `filename` fallback plus the UTF-8 `filename*` form.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(filename, FILENAME_ATTR)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::domain::{AttendanceTable, RecordStatus};
    use attendance_core::services::ExportRow;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_export_filename_sanitized() {
        assert_eq!(
            export_filename("Physics 101/\"A\"", "2024-03-01"),
            "Physics_101__A__2024-03-01.csv"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii_name() {
        let filename = export_filename("物理课 A", "2024-03-01");
        assert_eq!(filename, "物理课_A_2024-03-01.csv");
        assert_eq!(
            content_disposition(&filename),
            "attachment; filename=\"____A_2024-03-01.csv\"; \
             filename*=UTF-8''%E7%89%A9%E7%90%86%E8%AF%BE_A_2024-03-01.csv"
        );

        let header = content_disposition("Lab_2024-03-01.csv");
        assert!(header.is_ascii());
        assert!(header.ends_with("filename*=UTF-8''Lab_2024-03-01.csv"));
    }

    #[test]
    fn test_render_csv_with_bom_and_placeholder() {
        let table = AttendanceTable::new("Lab".to_string(), None, "g".to_string()).unwrap();
        let export = TableExport {
            table,
            rows: vec![
                ExportRow {
                    member_name: "Ada, L.".to_string(),
                    employee_id: "E1".to_string(),
                    contact: String::new(),
                    card_id: Some("04A1".to_string()),
                    date: NaiveDate::from_ymd_opt(2024, 3, 1),
                    checkin_time: NaiveTime::from_hms_opt(9, 5, 0),
                    checkout_time: None,
                    status: Some(RecordStatus::CheckedIn),
                },
                ExportRow {
                    member_name: "Bob".to_string(),
                    employee_id: "E2".to_string(),
                    contact: String::new(),
                    card_id: None,
                    date: None,
                    checkin_time: None,
                    checkout_time: None,
                    status: None,
                },
            ],
        };

        let bytes = render_csv(&export).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("\u{FEFF}Name,Employee ID,Contact,Card ID,Date,Check-in,Check-out,Status")
        );
        assert_eq!(lines.next(), Some("\"Ada, L.\",E1,,04A1,2024-03-01,09:05,,checkedin"));
        assert_eq!(lines.next(), Some("Bob,E2,,,,,,"));
    }
}
