//! HTTP API

pub mod auth_handlers;
pub mod handlers;
pub mod project_handlers;
pub mod routes;

pub use routes::create_router;
