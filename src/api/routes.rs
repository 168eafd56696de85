//! API route definitions

use super::auth_handlers;
use super::handlers::{self, SharedState};
use super::project_handlers;
use crate::auth::middleware::require_auth;
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::password_login))
        .route("/auth/logout", post(auth_handlers::logout));

    let protected = Router::new()
        .route("/auth/me", get(auth_handlers::get_me))
        .route("/auth/refresh", post(auth_handlers::refresh_token))
        // ====================================================================
        // Projects (scoped to the caller)
        // ====================================================================
        .route(
            "/api/projects",
            get(project_handlers::list_projects)
                .post(project_handlers::create_project)
                .delete(project_handlers::delete_projects),
        )
        .route(
            "/api/projects/search",
            post(project_handlers::search_projects),
        )
        .route(
            "/api/projects/{project_id}",
            delete(project_handlers::delete_project),
        )
        .layer(from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
