//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn health_check(&self) -> anyhow::Result<bool> {
        self.health_check().await
    }

    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserNode> {
        self.create_user(email, name, password_hash).await
    }

    async fn get_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserNode>> {
        self.get_user_by_id(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserNode>> {
        self.get_user_by_email(email).await
    }

    async fn touch_user_login(&self, id: Uuid) -> anyhow::Result<()> {
        self.touch_user_login(id).await
    }

    async fn create_project(&self, project: &ProjectNode) -> anyhow::Result<()> {
        self.create_project(project).await
    }

    async fn list_user_projects(&self, user_id: Uuid) -> anyhow::Result<Vec<ProjectNode>> {
        self.list_user_projects(user_id).await
    }

    async fn delete_user_project(&self, user_id: Uuid, project_id: Uuid) -> anyhow::Result<bool> {
        self.delete_user_project(user_id, project_id).await
    }

    async fn delete_user_projects(&self, user_id: Uuid) -> anyhow::Result<usize> {
        self.delete_user_projects(user_id).await
    }
}
