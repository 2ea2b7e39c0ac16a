//! Bearer token authentication and role gates

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use attendance_core::domain::Actor;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the bearer token into an [`Actor`] stored in the request
/// extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let actor = state.auth.authenticate(token).await?;
    debug!("Authenticated {} ({})", actor.username, actor.role.as_str());

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Must run inside [`require_auth`].
pub async fn require_super_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let actor = request
        .extensions()
        .get::<Actor>()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
    actor.require_super_admin()?;
    Ok(next.run(request).await)
}

/// Any authenticated user
pub struct CurrentUser(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
    }
}

/// An authenticated admin or super administrator
pub struct AdminUser(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(actor) = CurrentUser::from_request_parts(parts, state).await?;
        actor.require_admin()?;
        Ok(AdminUser(actor))
    }
}
