//! Graph models for users and the projects they own

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::solver::Item;

// ============================================================================
// User Node
// ============================================================================

/// A password-authenticated account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNode {
    pub id: Uuid,
    /// Always stored lowercased
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

// ============================================================================
// Project Node
// ============================================================================

/// A project recorded by a user: a knapsack item with an owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectNode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub workers: u32,
    pub profit: u32,
    pub created_at: DateTime<Utc>,
}

impl ProjectNode {
    pub fn new(user_id: Uuid, name: impl Into<String>, workers: u32, profit: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            workers,
            profit,
            created_at: Utc::now(),
        }
    }

    pub fn to_item(&self) -> Item {
        Item::new(self.name.clone(), self.workers, self.profit)
    }
}
