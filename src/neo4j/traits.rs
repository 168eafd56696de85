//! GraphStore trait definition
//!
//! Abstract interface over the user and project storage. `Neo4jClient`
//! implements it for production and `MockGraphStore` for tests.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage failures callers branch on. Carried inside `anyhow::Error`;
/// recover with `downcast_ref`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Returns true when the backing database answers a trivial query
    async fn health_check(&self) -> Result<bool>;

    // ========================================================================
    // User operations
    // ========================================================================

    /// Create a password user. The email is stored lowercased.
    /// Fails with [`StoreError::DuplicateEmail`] when the email is taken.
    async fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<UserNode>;

    /// Get a user by internal UUID
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserNode>>;

    /// Get a user by email (case-insensitive)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserNode>>;

    /// Update last_login_at to now
    async fn touch_user_login(&self, id: Uuid) -> Result<()>;

    // ========================================================================
    // Project operations
    // ========================================================================

    /// Store a project under its owner
    async fn create_project(&self, project: &ProjectNode) -> Result<()>;

    /// List a user's projects, oldest first
    async fn list_user_projects(&self, user_id: Uuid) -> Result<Vec<ProjectNode>>;

    /// Delete one project if the user owns it. Returns whether it existed.
    async fn delete_user_project(&self, user_id: Uuid, project_id: Uuid) -> Result<bool>;

    /// Delete all of a user's projects. Returns how many were removed.
    async fn delete_user_projects(&self, user_id: Uuid) -> Result<usize>;
}
