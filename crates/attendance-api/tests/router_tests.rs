//! End-to-end API tests against the in-memory store

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};
use tower::ServiceExt;

use attendance_api::{create_router, AppState};
use attendance_core::services::Clock;
use attendance_infrastructure::Repositories;
use attendance_shared::config::AppConfig;

struct FixedClock(NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

fn config() -> AppConfig {
    let mut config = AppConfig::defaults().unwrap();
    config.rate_limit.enabled = false;
    config.app.static_dir = None;
    config
}

fn app_with(config: AppConfig) -> Router {
    let at = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(8, 57, 42)
        .unwrap();
    let state = AppState::with_clock(Repositories::memory(), config, Arc::new(FixedClock(at)));
    create_router(state)
}

fn app() -> Router {
    app_with(config())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, method, uri, token, body).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn register_root(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "root", "password": "rootpass"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_user(app: &Router, root: &str, username: &str, role: &str, group: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/users",
        Some(root),
        Some(json!({
            "username": username,
            "password": "secret1",
            "role": role,
            "userGroup": group,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": username, "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_table(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/tables",
        Some(token),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_member(app: &Router, token: &str, table_id: &str, name: &str, employee_id: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/members",
        Some(token),
        Some(json!({"tableId": table_id, "name": name, "employeeId": employee_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_first_user_bootstrap() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/auth/check-setup", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["needsSetup"], true);
    assert_eq!(body["data"]["userCount"], 0);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "root", "password": "rootpass"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["role"], "superadmin");
    assert_eq!(body["data"]["user"]["isSuperAdmin"], true);
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "second", "password": "rootpass"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (_, body) = send(&app, "GET", "/api/auth/check-setup", None, None).await;
    assert_eq!(body["data"]["hasUsers"], true);
    assert_eq!(body["data"]["needsSetup"], false);
}

#[tokio::test]
async fn test_register_short_password() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "root", "password": "12345"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = app();
    register_root(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "root", "password": "wrong-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "root", "password": "rootpass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "root");
}

#[tokio::test]
async fn test_requires_token() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/tables", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "GET", "/api/tables", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_card_checkin_flow() {
    let app = app();
    let root = register_root(&app).await;
    let admin = create_user(&app, &root, "lecturer", "admin", "physics").await;

    let table_id = create_table(&app, &admin, "Physics 101").await;
    let ada = create_member(&app, &admin, &table_id, "Ada", "E1").await;
    let bob = create_member(&app, &admin, &table_id, "Bob", "E2").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/members",
        Some(&admin),
        Some(json!({"tableId": table_id, "name": "Eve", "employeeId": "E1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/members/{}/bind-card", ada),
        Some(&admin),
        Some(json!({"cardId": "04a1b2\r\n"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cardId"], "04A1B2");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/members/{}/bind-card", bob),
        Some(&admin),
        Some(json!({"cardId": "04A1B2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/api/members/by-card/04a1b2", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings/active-table",
        Some(&admin),
        Some(json!({"tableId": table_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["activeTable"], table_id.as_str());

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings/mode",
        Some(&admin),
        Some(json!({"mode": "checkout"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mode"], "checkout");

    // Checkout before checkin
    let (status, _) = send(
        &app,
        "POST",
        "/api/records/card-checkin",
        Some(&admin),
        Some(json!({"cardId": "04A1B2", "tableId": table_id, "recordType": "checkout"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/records/card-checkin",
        Some(&admin),
        Some(json!({"cardId": "04A1B2", "tableId": table_id, "recordType": "checkin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["memberName"], "Ada");
    assert_eq!(body["data"]["memberEmployeeId"], "E1");
    assert_eq!(body["data"]["date"], "2024-03-01");
    assert_eq!(body["message"], "Ada checked in at 08:57");
    assert_eq!(body["data"]["time"], "08:57");

    let (status, _) = send(
        &app,
        "POST",
        "/api/records/card-checkin",
        Some(&admin),
        Some(json!({"cardId": "04A1B2", "tableId": table_id, "recordType": "checkout"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/records?tableId={}&date=2024-03-01", table_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "completed");
    assert_eq!(records[0]["memberName"], "Ada");
    assert_eq!(records[0]["memberEmployeeId"], "E1");
    assert_eq!(records[0]["checkinTime"], "08:57");

    let (status, body) = send(&app, "GET", &format!("/api/tables/{}", table_id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["memberCount"], 2);

    let (status, bytes) = send_raw(
        &app,
        "GET",
        &format!("/api/tables/{}/export", table_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(bytes).unwrap();
    assert!(csv.starts_with('\u{FEFF}'));
    assert!(csv.contains("Ada,E1,,04A1B2,2024-03-01,08:57,08:57,completed"));
    assert!(csv.contains("Bob,E2,,,,,,"));
}

#[tokio::test]
async fn test_card_from_another_table() {
    let app = app();
    let root = register_root(&app).await;
    let admin = create_user(&app, &root, "lecturer", "admin", "physics").await;
    let lab = create_table(&app, &admin, "Lab").await;
    let lecture = create_table(&app, &admin, "Lecture").await;
    let ada = create_member(&app, &admin, &lab, "Ada", "E1").await;
    send(
        &app,
        "PUT",
        &format!("/api/members/{}/bind-card", ada),
        Some(&admin),
        Some(json!({"cardId": "CAFE"})),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/records/card-checkin",
        Some(&admin),
        Some(json!({"cardId": "CAFE", "tableId": lecture, "recordType": "checkin"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/records/card-checkin",
        Some(&admin),
        Some(json!({"cardId": "BEEF", "tableId": lab, "recordType": "checkin"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_records_and_patch() {
    let app = app();
    let root = register_root(&app).await;
    let admin = create_user(&app, &root, "lecturer", "admin", "physics").await;
    let table_id = create_table(&app, &admin, "Lab").await;
    let ada = create_member(&app, &admin, &table_id, "Ada", "E1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(&admin),
        Some(json!({
            "tableId": table_id,
            "memberId": ada,
            "recordType": "checkin",
            "date": "2024-02-28",
            "time": "09:10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "checkedin");
    let record_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(&admin),
        Some(json!({
            "tableId": table_id,
            "memberId": ada,
            "recordType": "checkout",
            "date": "2024-02-28",
            "time": "17:45"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], record_id.as_str());
    assert_eq!(body["data"]["status"], "completed");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/records/{}", record_id),
        Some(&admin),
        Some(json!({"checkoutTime": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "checkedin");
    assert_eq!(body["data"]["checkoutDate"], "2024-02-28");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/records/{}", record_id),
        Some(&admin),
        Some(json!({"checkinDate": null, "checkoutDate": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/api/records/{}", record_id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/api/records/{}", record_id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_type_is_required() {
    let app = app();
    let root = register_root(&app).await;
    let table_id = create_table(&app, &root, "Lab").await;
    let ada = create_member(&app, &root, &table_id, "Ada", "E1").await;
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/members/{}/bind-card", ada),
        Some(&root),
        Some(json!({"cardId": "CAFE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(&root),
        Some(json!({
            "tableId": table_id,
            "memberId": ada,
            "date": "2024-03-01",
            "time": "09:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/records/card-checkin",
        Some(&root),
        Some(json!({"cardId": "CAFE", "tableId": table_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/records/card-checkin",
        Some(&root),
        Some(json!({"cardId": "CAFE", "tableId": table_id, "recordType": "lunch"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/records?tableId={}", table_id),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_card_checkout_keeps_manual_checkout() {
    let app = app();
    let root = register_root(&app).await;
    let table_id = create_table(&app, &root, "Lab").await;
    let ada = create_member(&app, &root, &table_id, "Ada", "E1").await;
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/members/{}/bind-card", ada),
        Some(&root),
        Some(json!({"cardId": "CAFE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(&root),
        Some(json!({
            "tableId": table_id,
            "memberId": ada,
            "recordType": "checkout",
            "date": "2024-03-01",
            "time": "07:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");

    let (status, _) = send(
        &app,
        "POST",
        "/api/records/card-checkin",
        Some(&root),
        Some(json!({"cardId": "CAFE", "tableId": table_id, "recordType": "checkout"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/records?tableId={}&date=2024-03-01", table_id),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["checkoutTime"], "07:00");
    assert_eq!(records[0]["checkinTime"], Value::Null);
}

#[tokio::test]
async fn test_group_isolation_and_roles() {
    let app = app();
    let root = register_root(&app).await;
    let physics = create_user(&app, &root, "lecturer", "admin", "physics").await;
    let chemist = create_user(&app, &root, "chemist", "admin", "chemistry").await;
    let student = create_user(&app, &root, "student", "user", "physics").await;

    let table_id = create_table(&app, &physics, "Lab").await;

    let (status, _) = send(&app, "GET", &format!("/api/tables/{}", table_id), Some(&chemist), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/tables", Some(&chemist), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, _) = send(&app, "GET", &format!("/api/tables/{}", table_id), Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/tables",
        Some(&student),
        Some(json!({"name": "Mine"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, "GET", "/api/tables?userGroup=physics", Some(&root), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/api/users", Some(&physics), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_management_rules() {
    let app = app();
    let root = register_root(&app).await;

    let (_, body) = send(&app, "GET", "/api/auth/me", Some(&root), None).await;
    let root_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&root),
        Some(json!({"username": "boss", "password": "secret1", "role": "superadmin"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    create_user(&app, &root, "bob", "user", "physics").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&root),
        Some(json!({"username": "bob", "password": "secret1", "role": "user"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, "GET", "/api/users", Some(&root), None).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "bob");
    let bob_id = users[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "DELETE", &format!("/api/users/{}", root_id), Some(&root), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", bob_id),
        Some(&root),
        Some(json!({"role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/{}/password", root_id),
        Some(&root),
        Some(json!({"newPassword": "brand-new"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/batch-delete",
        Some(&root),
        Some(json!({"userIds": [bob_id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deletedCount"], 1);
}

#[tokio::test]
async fn test_delete_table_cascades() {
    let app = app();
    let root = register_root(&app).await;
    let table_id = create_table(&app, &root, "Lab").await;
    let ada = create_member(&app, &root, &table_id, "Ada", "E1").await;
    send(
        &app,
        "PUT",
        &format!("/api/members/{}/bind-card", ada),
        Some(&root),
        Some(json!({"cardId": "CAFE"})),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/api/tables/{}", table_id), Some(&root), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/members/by-card/CAFE", Some(&root), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let app = app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");

    let (status, body) = send(&app, "GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, "GET", "/api/tables/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rate_limit() {
    let mut config = config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_seconds = 60;
    let app = app_with(config);

    for _ in 0..2 {
        let (status, _) = send(&app, "GET", "/api/auth/check-setup", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, "GET", "/api/auth/check-setup", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    // Health is outside the API and never limited
    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

async fn check_setup_from(app: &Router, forwarded: &str) -> StatusCode {
    let request = Request::builder()
        .uri("/api/auth/check-setup")
        .header("x-forwarded-for", forwarded)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_rate_limit_ignores_spoofed_forwarded_for() {
    let mut config = config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_seconds = 60;
    let app = app_with(config);

    let mut statuses = Vec::new();
    for i in 0..5 {
        statuses.push(check_setup_from(&app, &format!("10.0.0.{}", i)).await);
    }
    assert_eq!(statuses[..2], [StatusCode::OK, StatusCode::OK]);
    assert!(statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_rate_limit_trusted_proxy_keys_on_forwarded_for() {
    let mut config = config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_seconds = 60;
    config.rate_limit.trust_forwarded = true;
    let app = app_with(config);

    for i in 0..5 {
        assert_eq!(check_setup_from(&app, &format!("10.0.0.{}", i)).await, StatusCode::OK);
    }
    assert_eq!(check_setup_from(&app, "10.0.0.1").await, StatusCode::OK);
    assert_eq!(check_setup_from(&app, "10.0.0.1").await, StatusCode::TOO_MANY_REQUESTS);
}
