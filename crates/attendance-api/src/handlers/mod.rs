//! HTTP handlers

pub mod auth;
pub mod health;
pub mod members;
pub mod records;
pub mod settings;
pub mod tables;
pub mod users;

use axum::http::Uri;

use crate::error::ApiError;

/// Unknown API path
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
