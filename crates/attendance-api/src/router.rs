// ============================================================================
// Attendance API - Router
// File: crates/attendance-api/src/router.rs
// ============================================================================
//! Route table and tower layers

use std::path::Path;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::handlers::{self, auth, health, members, records, settings, tables, users};
use crate::middleware::{rate_limit, require_auth, require_super_admin};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let public_auth = Router::new()
        .route("/check-setup", get(auth::check_setup))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/tables", table_routes())
        .nest("/members", member_routes())
        .nest("/records", record_routes())
        .nest("/settings", settings_routes())
        .nest("/users", user_routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .nest("/auth", public_auth)
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let router = Router::new()
        .route("/health", get(health::health))
        .nest("/api", api);

    let router = match state.config.app.static_dir.as_deref() {
        Some(dir) if Path::new(dir).is_dir() => {
            info!("Serving dashboard from {}", dir);
            let index = Path::new(dir).join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        Some(dir) => {
            warn!("Static directory {} not found, dashboard disabled", dir);
            router.fallback(handlers::not_found)
        }
        None => router.fallback(handlers::not_found),
    };

    let cors = cors_layer(&state.config.app.cors_origin);

    router
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn table_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tables::list).post(tables::create))
        .route(
            "/{id}",
            get(tables::get).put(tables::update).delete(tables::delete),
        )
        .route("/{id}/export", get(tables::export))
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(members::list).post(members::create))
        .route("/batch-delete", post(members::batch_delete))
        .route("/by-card/{card_id}", get(members::by_card))
        .route("/{id}", put(members::update).delete(members::delete))
        .route("/{id}/bind-card", put(members::bind_card))
        .route("/{id}/unbind-card", put(members::unbind_card))
}

fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(records::list).post(records::create))
        .route("/card-checkin", post(records::card_checkin))
        .route("/{id}", put(records::update).delete(records::delete))
}

fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::get))
        .route("/active-table", put(settings::set_active_table))
        .route("/mode", put(settings::set_mode))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/batch-delete", post(users::batch_delete))
        .route(
            "/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/{id}/password", put(users::change_password))
        .layer(middleware::from_fn(require_super_admin))
}

/// `*` allows any origin; otherwise a comma separated list.
fn cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([HeaderName::from_static("content-disposition")]);

    if origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let list: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(list))
}
