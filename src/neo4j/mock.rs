//! In-memory mock implementation of GraphStore for testing.
//!
//! Uses `tokio::sync::RwLock` collections. Projects are kept in a `Vec`
//! so listing preserves insertion order.

use crate::neo4j::models::*;
use crate::neo4j::traits::{GraphStore, StoreError};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    pub users: RwLock<HashMap<Uuid, UserNode>>,
    pub projects: RwLock<Vec<ProjectNode>>,
    /// When set, every project write fails (simulates a storage outage)
    pub fail_writes: AtomicBool,
    pub healthy: AtomicBool,
}

impl MockGraphStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            projects: RwLock::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            healthy: AtomicBool::new(true),
        }
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("mock store: writes disabled");
        }
        Ok(())
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn health_check(&self) -> Result<bool> {
        Ok(self.healthy.load(Ordering::SeqCst))
    }

    async fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<UserNode> {
        let email = email.trim().to_lowercase();
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail(email).into());
        }
        let now = Utc::now();
        let user = UserNode {
            id: Uuid::new_v4(),
            email,
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            last_login_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserNode>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserNode>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn touch_user_login(&self, id: Uuid) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.last_login_at = Utc::now();
        }
        Ok(())
    }

    async fn create_project(&self, project: &ProjectNode) -> Result<()> {
        self.check_writes()?;
        if !self.users.read().await.contains_key(&project.user_id) {
            anyhow::bail!("create_project: owner {} not found", project.user_id);
        }
        self.projects.write().await.push(project.clone());
        Ok(())
    }

    async fn list_user_projects(&self, user_id: Uuid) -> Result<Vec<ProjectNode>> {
        Ok(self
            .projects
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_user_project(&self, user_id: Uuid, project_id: Uuid) -> Result<bool> {
        self.check_writes()?;
        let mut projects = self.projects.write().await;
        let before = projects.len();
        projects.retain(|p| !(p.id == project_id && p.user_id == user_id));
        Ok(projects.len() < before)
    }

    async fn delete_user_projects(&self, user_id: Uuid) -> Result<usize> {
        self.check_writes()?;
        let mut projects = self.projects.write().await;
        let before = projects.len();
        projects.retain(|p| p.user_id != user_id);
        Ok(before - projects.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let store = MockGraphStore::new();
        let user = store
            .create_user("Alice@Example.com", "Alice", "hash")
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");

        let found = store.get_user_by_email("ALICE@example.COM").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_typed_error() {
        let store = MockGraphStore::new();
        store.create_user("dup@x.io", "A", "h").await.unwrap();

        let err = store.create_user(" DUP@x.io", "B", "h").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::DuplicateEmail("dup@x.io".into()))
        );
    }

    #[tokio::test]
    async fn test_projects_scoped_to_owner() {
        let store = MockGraphStore::new();
        let alice = store.create_user("a@x.io", "A", "h").await.unwrap();
        let bob = store.create_user("b@x.io", "B", "h").await.unwrap();

        let mine = ProjectNode::new(alice.id, "mine", 1, 1);
        store.create_project(&mine).await.unwrap();
        store
            .create_project(&ProjectNode::new(bob.id, "theirs", 1, 1))
            .await
            .unwrap();

        assert!(!store.delete_user_project(bob.id, mine.id).await.unwrap());
        assert_eq!(store.list_user_projects(alice.id).await.unwrap().len(), 1);

        assert_eq!(store.delete_user_projects(alice.id).await.unwrap(), 1);
        assert!(store.list_user_projects(alice.id).await.unwrap().is_empty());
        assert_eq!(store.list_user_projects(bob.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_project_requires_owner() {
        let store = MockGraphStore::new();
        let orphan = ProjectNode::new(Uuid::new_v4(), "orphan", 1, 1);
        assert!(store.create_project(&orphan).await.is_err());
    }
}
