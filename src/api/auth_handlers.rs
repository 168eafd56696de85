//! Authentication route handlers: sign-up, password login, logout, user info.
//!
//! Endpoints:
//! - `POST /auth/register`: Create an account and log in
//! - `POST /auth/login`: Email/password login
//! - `POST /auth/logout`: Clear the session cookie
//! - `GET  /auth/me`: Returns the authenticated user (protected)
//! - `POST /auth/refresh`: Issues a new JWT from a still-valid one (protected)

use crate::api::handlers::{AppError, Flash, SharedState};
use crate::auth::extractor::AuthUser;
use crate::auth::jwt::encode_jwt;
use crate::auth::session::{build_clear_cookie, build_session_cookie};
use crate::neo4j::models::UserNode;
use crate::neo4j::StoreError;
use crate::AuthConfig;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;
const EMAIL_TAKEN: &str = "An account with this email already exists";

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Checked against `password` when present
    #[serde(default)]
    pub password_confirm: Option<String>,
}

#[derive(Serialize)]
pub struct AuthTokenResponse {
    pub token: String,
    pub user: UserResponse,
    pub flash: Flash,
}

#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub flash: Flash,
}

/// Public user info (safe to send to client)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<UserNode> for UserResponse {
    fn from(u: UserNode) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn auth_config(state: &SharedState) -> Result<&AuthConfig, AppError> {
    state
        .auth_config
        .as_ref()
        .ok_or_else(|| AppError::Forbidden("Authentication not configured".to_string()))
}

/// Issue a token for `user` plus the matching `Set-Cookie` header.
fn issue_session(
    config: &AuthConfig,
    user_id: Uuid,
    email: &str,
    name: &str,
) -> Result<(String, HeaderMap), AppError> {
    let token = encode_jwt(
        user_id,
        email,
        name,
        &config.jwt_secret,
        config.jwt_expiry_secs,
    )?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        build_session_cookie(&token, config.jwt_expiry_secs)?,
    );
    Ok((token, headers))
}

fn validate_registration(req: &RegisterRequest, config: &AuthConfig) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let email = req.email.trim().to_lowercase();
    let domain_ok = email
        .split_once('@')
        .map_or(false, |(local, domain)| !local.is_empty() && domain.contains('.'));
    if !domain_ok {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if let Some(ref confirm) = req.password_confirm {
        if confirm != &req.password {
            return Err(AppError::BadRequest("Passwords don't match".to_string()));
        }
    }

    if !config.email_allowed(&email) {
        return Err(AppError::Forbidden(format!(
            "Email domain not allowed (expected @{})",
            config.allowed_email_domain.as_deref().unwrap_or_default()
        )));
    }

    Ok(())
}

/// A concurrent sign-up can claim the email between the lookup and the insert.
fn create_user_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::DuplicateEmail(_)) => AppError::Conflict(EMAIL_TAKEN.to_string()),
        None => AppError::Internal(err),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register: Create a password account, then log in.
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthTokenResponse>), AppError> {
    let config = auth_config(&state)?;

    if !config.allow_registration {
        return Err(AppError::Forbidden("Registration is disabled".to_string()));
    }

    validate_registration(&req, config)?;

    if state.neo4j.get_user_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password = req.password;
    let cost = config.bcrypt_cost;
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?;

    let user = state
        .neo4j
        .create_user(&req.email, req.name.trim(), &password_hash)
        .await
        .map_err(create_user_error)?;
    tracing::info!(user_id = %user.id, "Account created");

    let (token, headers) = issue_session(config, user.id, &user.email, &user.name)?;

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthTokenResponse {
            token,
            user: UserResponse::from(user),
            flash: Flash::success("Account created!"),
        }),
    ))
}

/// POST /auth/login: Email/password authentication.
///
/// Error messages never reveal whether the email exists.
pub async fn password_login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthTokenResponse>), AppError> {
    let config = auth_config(&state)?;

    let invalid_credentials = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .neo4j
        .get_user_by_email(&req.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password = req.password;
    let hash = user.password_hash.clone();
    let password_ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Verify task failed: {}", e)))?
        .unwrap_or(false);
    if !password_ok {
        tracing::debug!(user_id = %user.id, "Rejected login: bad password");
        return Err(invalid_credentials());
    }

    state.neo4j.touch_user_login(user.id).await?;
    tracing::info!(user_id = %user.id, "Logged in");

    let (token, headers) = issue_session(config, user.id, &user.email, &user.name)?;

    Ok((
        headers,
        Json(AuthTokenResponse {
            token,
            user: UserResponse::from(user),
            flash: Flash::success("Logged in successfully!"),
        }),
    ))
}

/// POST /auth/logout: Clears the session cookie. JWTs are stateless, so a
/// client holding the raw token keeps it until expiry.
pub async fn logout() -> (HeaderMap, Json<LogoutResponse>) {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, build_clear_cookie());
    (
        headers,
        Json(LogoutResponse {
            flash: Flash::success("Logged out."),
        }),
    )
}

/// GET /auth/me: Returns the authenticated user's info.
pub async fn get_me(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user_node = state
        .neo4j
        .get_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user_node)))
}

/// POST /auth/refresh: Issue a new JWT (and cookie) from a still-valid one.
pub async fn refresh_token(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<(HeaderMap, Json<RefreshTokenResponse>), AppError> {
    let config = auth_config(&state)?;
    let (token, headers) = issue_session(config, user.user_id, &user.email, &user.name)?;
    Ok((headers, Json(RefreshTokenResponse { token })))
}

#[cfg(test)]
mod tests {
    use crate::api::create_router;
    use crate::auth::jwt::{decode_jwt, encode_jwt};
    use crate::test_helpers::{
        body_json, bootstrap_user, mock_server_state, post_json, test_auth_config, TEST_SECRET,
    };
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt; // oneshot

    fn register_body(email: &str, password: &str, name: &str) -> serde_json::Value {
        serde_json::json!({ "email": email, "password": password, "name": name })
    }

    #[tokio::test]
    async fn test_register_success_sets_cookie() {
        let app = create_router(mock_server_state(Some(test_auth_config())));

        let resp = app
            .oneshot(post_json(
                "/auth/register",
                register_body("Hana@Example.com", "longenough", "Hana"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("session="));

        let json = body_json(resp).await;
        assert_eq!(json["user"]["email"], "hana@example.com");
        assert_eq!(json["flash"]["category"], "success");

        let claims = decode_jwt(json["token"].as_str().unwrap(), TEST_SECRET).unwrap();
        assert_eq!(claims.name, "Hana");
    }

    #[tokio::test]
    async fn test_register_disabled_returns_403() {
        let mut config = test_auth_config();
        config.allow_registration = false;
        let app = create_router(mock_server_state(Some(config)));

        let resp = app
            .oneshot(post_json(
                "/auth/register",
                register_body("i@example.com", "longenough", "I"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_returns_409() {
        let state = mock_server_state(Some(test_auth_config()));
        bootstrap_user(&state, "jo@example.com", "longenough").await;
        let app = create_router(state);

        let resp = app
            .oneshot(post_json(
                "/auth/register",
                register_body("JO@example.com", "longenough", "Jo"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_store_duplicate_maps_to_conflict() {
        use super::{create_user_error, AppError};
        use crate::neo4j::StoreError;

        let err = anyhow::Error::from(StoreError::DuplicateEmail("jo@example.com".into()));
        assert!(matches!(create_user_error(err), AppError::Conflict(_)));

        let err = anyhow::anyhow!("connection reset");
        assert!(matches!(create_user_error(err), AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let cases = [
            register_body("bad-email", "longenough", "K"),
            register_body("k@nodot", "longenough", "K"),
            register_body("k@example.com", "short", "K"),
            register_body("k@example.com", "longenough", "   "),
            serde_json::json!({
                "email": "k@example.com",
                "password": "longenough",
                "password_confirm": "different1",
                "name": "K"
            }),
        ];

        for body in cases {
            let app = create_router(mock_server_state(Some(test_auth_config())));
            let resp = app.oneshot(post_json("/auth/register", body.clone())).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        }
    }

    #[tokio::test]
    async fn test_register_wrong_domain_returns_403() {
        let mut config = test_auth_config();
        config.allowed_email_domain = Some("example.com".to_string());
        let app = create_router(mock_server_state(Some(config)));

        let resp = app
            .oneshot(post_json(
                "/auth/register",
                register_body("l@elsewhere.org", "longenough", "L"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_success_and_failure() {
        let state = mock_server_state(Some(test_auth_config()));
        bootstrap_user(&state, "max@example.com", "correct-horse").await;

        let app = create_router(state.clone());
        let resp = app
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({ "email": "max@example.com", "password": "correct-horse" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(header::SET_COOKIE));
        let json = body_json(resp).await;
        assert_eq!(json["user"]["email"], "max@example.com");

        let app = create_router(state);
        let resp = app
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({ "email": "max@example.com", "password": "wrong-horse" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_unknown_email_returns_401() {
        let app = create_router(mock_server_state(Some(test_auth_config())));
        let resp = app
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({ "email": "nobody@example.com", "password": "whatever" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_login_no_auth_config_returns_403() {
        let app = create_router(mock_server_state(None));
        let resp = app
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({ "email": "a@example.com", "password": "whatever" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let app = create_router(mock_server_state(Some(test_auth_config())));
        let resp = app
            .oneshot(post_json("/auth/logout", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_me_via_cookie() {
        let state = mock_server_state(Some(test_auth_config()));
        let (user_id, token) = bootstrap_user(&state, "nia@example.com", "longenough").await;
        let app = create_router(state);

        let req = Request::builder()
            .uri("/auth/me")
            .header("cookie", format!("session={}", token))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["id"], user_id.to_string());
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_me_for_deleted_user_returns_404() {
        let app = create_router(mock_server_state(Some(test_auth_config())));
        let token =
            encode_jwt(uuid::Uuid::new_v4(), "ghost@example.com", "Ghost", TEST_SECRET, 60)
                .unwrap();

        let req = Request::builder()
            .uri("/auth/me")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_refresh_returns_valid_token() {
        let state = mock_server_state(Some(test_auth_config()));
        let (user_id, token) = bootstrap_user(&state, "oz@example.com", "longenough").await;
        let app = create_router(state);

        let req = Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(header::SET_COOKIE));

        let json = body_json(resp).await;
        let claims = decode_jwt(json["token"].as_str().unwrap(), TEST_SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }
}
