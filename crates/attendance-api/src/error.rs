//! API errors and their HTTP mapping

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use attendance_core::error::DomainError;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::UserNotFound
            | DomainError::TableNotFound
            | DomainError::MemberNotFound
            | DomainError::RecordNotFound
            | DomainError::CardNotBound(_) => ApiError::NotFound(message),

            DomainError::TokenExpired => ApiError::TokenExpired,
            DomainError::InvalidCredentials => ApiError::Unauthorized(message),
            DomainError::Unauthorized(reason) => ApiError::Unauthorized(reason),

            DomainError::Forbidden(reason) => ApiError::Forbidden(reason),
            DomainError::SetupAlreadyCompleted => ApiError::Forbidden(message),

            DomainError::UsernameAlreadyExists(_)
            | DomainError::EmployeeIdAlreadyExists(_)
            | DomainError::CardAlreadyBound(_)
            | DomainError::RecordAlreadyExists => ApiError::Conflict(message),

            DomainError::MemberNotInTable
            | DomainError::CheckinRequired
            | DomainError::PasswordTooShort
            | DomainError::PasswordTooLong
            | DomainError::SelfModification(_) => ApiError::BadRequest(message),
            DomainError::ValidationError(reason) => ApiError::BadRequest(reason),

            DomainError::DatabaseError(reason) => ApiError::DatabaseError(reason),
            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::InternalError(_) => ApiError::InternalError(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::from(errors).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
            }
            ApiError::TokenExpired => {
                tracing::debug!("Token expired");
                (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Token expired".to_string())
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg)
            }
            ApiError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, "CONFLICT", msg)
            }
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests, try again later".to_string(),
            ),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(code, &message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
