//! Test helper factories and mock state builders
#![allow(dead_code)]

use crate::api::handlers::{ServerState, SharedState};
use crate::auth::jwt::encode_jwt;
use crate::neo4j::mock::MockGraphStore;
use crate::solver::Limits;
use crate::AuthConfig;
use axum::body::Body;
use axum::http::{Method, Request};
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-minimum-32-chars!!";

/// Auth config with registration on and a cheap bcrypt cost
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_secs: 3600,
        allowed_email_domain: None,
        allow_registration: true,
        bcrypt_cost: 4,
    }
}

// ============================================================================
// Mock state builders
// ============================================================================

pub fn server_state_with_limits(
    store: Arc<MockGraphStore>,
    auth_config: Option<AuthConfig>,
    limits: Limits,
) -> SharedState {
    Arc::new(ServerState {
        neo4j: store,
        auth_config,
        limits,
    })
}

pub fn server_state_with(
    store: Arc<MockGraphStore>,
    auth_config: Option<AuthConfig>,
) -> SharedState {
    server_state_with_limits(store, auth_config, Limits::default())
}

/// Server state over an empty in-memory store
pub fn mock_server_state(auth_config: Option<AuthConfig>) -> SharedState {
    server_state_with(Arc::new(MockGraphStore::new()), auth_config)
}

/// Create a user directly in the store and return its id and a valid token.
pub async fn bootstrap_user(state: &SharedState, email: &str, password: &str) -> (Uuid, String) {
    let name = email.split('@').next().unwrap_or(email);
    let hash = bcrypt::hash(password, 4).expect("bcrypt hash");
    let user = state
        .neo4j
        .create_user(email, name, &hash)
        .await
        .expect("create user");
    let token = encode_jwt(user.id, &user.email, &user.name, TEST_SECRET, 3600).expect("token");
    (user.id, token)
}

// ============================================================================
// Request / response helpers
// ============================================================================

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_request(
    method: Method,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request")
}

pub async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json body")
}
