//! Auth middleware for Axum routes.
//!
//! Validates the JWT (Bearer header, falling back to the session cookie) and
//! injects Claims into request extensions. Deny-by-default: if
//! `auth_config` is None, all requests are rejected.

use crate::api::handlers::{AppError, SharedState};
use crate::auth::jwt::{decode_jwt, Claims};
use crate::auth::session::extract_session_token;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Pull the raw token out of the request headers.
///
/// A malformed `Authorization` header is an error even when a cookie is
/// present.
fn token_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Unauthorized("Invalid Authorization header format".to_string())
            });
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(extract_session_token)
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))
}

/// Middleware that requires a valid session.
///
/// # Behavior
/// 1. If `auth_config` is `None` → 403 Forbidden
/// 2. Bearer header, else `session` cookie → 401 if neither
/// 3. Validate JWT with the configured secret → 401 if invalid/expired
/// 4. Check `allowed_email_domain` if configured → 403 on mismatch
/// 5. Inject `Claims` into request extensions
pub async fn require_auth(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_config = state.auth_config.as_ref().ok_or_else(|| {
        AppError::Forbidden("Authentication not configured: access denied".to_string())
    })?;

    let token = token_from_headers(req.headers())?;

    let claims: Claims = decode_jwt(&token, &auth_config.jwt_secret)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    if !auth_config.email_allowed(&claims.email) {
        return Err(AppError::Forbidden(format!(
            "Email domain not allowed (expected @{})",
            auth_config.allowed_email_domain.as_deref().unwrap_or_default()
        )));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
