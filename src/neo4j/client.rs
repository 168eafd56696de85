//! Neo4j client for user and project storage

use super::models::*;
use super::traits::StoreError;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use neo4rs::{query, Graph};
use std::sync::Arc;
use uuid::Uuid;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

/// Timestamps are stored as fixed-width RFC 3339 strings so that string
/// ordering matches chronological ordering.
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

const CONSTRAINT_VIOLATION: &str = "Neo.ClientError.Schema.ConstraintValidationFailed";

fn is_constraint_violation(err: &neo4rs::Error) -> bool {
    matches!(err, neo4rs::Error::Neo4j(e) if e.code() == CONSTRAINT_VIOLATION)
}

fn parse_timestamp(node: &neo4rs::Node, key: &str) -> DateTime<Utc> {
    node.get::<String>(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(Utc::now)
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with constraints and indexes
    async fn init_schema(&self) -> Result<()> {
        let statements = [
            "CREATE CONSTRAINT user_id IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
            "CREATE CONSTRAINT user_email IF NOT EXISTS FOR (u:User) REQUIRE u.email IS UNIQUE",
            "CREATE CONSTRAINT project_id IF NOT EXISTS FOR (p:Project) REQUIRE p.id IS UNIQUE",
            "CREATE INDEX project_user IF NOT EXISTS FOR (p:Project) ON (p.user_id)",
        ];

        for statement in statements {
            if let Err(e) = self.graph.run(query(statement)).await {
                tracing::warn!("Schema statement may already exist: {}", e);
            }
        }

        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool> {
        let mut result = self.graph.execute(query("RETURN 1 AS ok")).await?;
        Ok(result.next().await?.is_some())
    }

    // ========================================================================
    // User operations
    // ========================================================================

    /// Create a password-authenticated user
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<UserNode> {
        let now = Utc::now();
        let email = email.trim().to_lowercase();
        let q = query(
            r#"
            CREATE (u:User {
                id: $id,
                email: $email,
                name: $name,
                password_hash: $password_hash,
                created_at: $created_at,
                last_login_at: $created_at
            })
            RETURN u
            "#,
        )
        .param("id", Uuid::new_v4().to_string())
        .param("email", email.clone())
        .param("name", name.to_string())
        .param("password_hash", password_hash.to_string())
        .param("created_at", timestamp(&now));

        // The unique constraint on email can fire on submit or on first fetch
        let duplicate = |e: neo4rs::Error| -> anyhow::Error {
            if is_constraint_violation(&e) {
                StoreError::DuplicateEmail(email.clone()).into()
            } else {
                anyhow::Error::new(e).context("Failed to create user")
            }
        };

        let mut result = self.graph.execute(q).await.map_err(duplicate)?;
        match result.next().await.map_err(duplicate)? {
            Some(row) => {
                let node: neo4rs::Node = row.get("u")?;
                self.node_to_user(&node)
            }
            None => anyhow::bail!("create_user: no row returned"),
        }
    }

    /// Get a user by internal UUID
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserNode>> {
        let q = query("MATCH (u:User {id: $id}) RETURN u").param("id", id.to_string());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("u")?;
            Ok(Some(self.node_to_user(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Get a user by email (case-insensitive)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserNode>> {
        let q = query("MATCH (u:User {email: $email}) RETURN u")
            .param("email", email.trim().to_lowercase());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("u")?;
            Ok(Some(self.node_to_user(&node)?))
        } else {
            Ok(None)
        }
    }

    pub async fn touch_user_login(&self, id: Uuid) -> Result<()> {
        let q = query("MATCH (u:User {id: $id}) SET u.last_login_at = $now")
            .param("id", id.to_string())
            .param("now", timestamp(&Utc::now()));
        self.graph.run(q).await?;
        Ok(())
    }

    fn node_to_user(&self, node: &neo4rs::Node) -> Result<UserNode> {
        Ok(UserNode {
            id: node.get::<String>("id")?.parse()?,
            email: node.get("email")?,
            name: node.get("name")?,
            password_hash: node.get("password_hash")?,
            created_at: parse_timestamp(node, "created_at"),
            last_login_at: parse_timestamp(node, "last_login_at"),
        })
    }

    // ========================================================================
    // Project operations
    // ========================================================================

    /// Store a project and link it to its owner.
    ///
    /// `seq` comes from a counter on the owner. Bumping it write-locks the
    /// user node, so concurrent inserts for one user get increasing values.
    pub async fn create_project(&self, project: &ProjectNode) -> Result<()> {
        let q = query(
            r#"
            MATCH (u:User {id: $user_id})
            SET u.project_seq = coalesce(u.project_seq, 0) + 1
            CREATE (u)-[:OWNS]->(p:Project {
                id: $id,
                user_id: $user_id,
                name: $name,
                workers: $workers,
                profit: $profit,
                created_at: $created_at,
                seq: u.project_seq
            })
            RETURN p.id AS id
            "#,
        )
        .param("id", project.id.to_string())
        .param("user_id", project.user_id.to_string())
        .param("name", project.name.clone())
        .param("workers", i64::from(project.workers))
        .param("profit", i64::from(project.profit))
        .param("created_at", timestamp(&project.created_at));

        let mut result = self
            .graph
            .execute(q)
            .await
            .context("Failed to create project")?;
        if result.next().await?.is_none() {
            anyhow::bail!("create_project: owner {} not found", project.user_id);
        }
        Ok(())
    }

    /// List a user's projects in insertion order
    pub async fn list_user_projects(&self, user_id: Uuid) -> Result<Vec<ProjectNode>> {
        let q = query(
            r#"
            MATCH (p:Project {user_id: $user_id})
            RETURN p
            ORDER BY p.seq ASC
            "#,
        )
        .param("user_id", user_id.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut projects = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("p")?;
            projects.push(self.node_to_project(&node)?);
        }
        Ok(projects)
    }

    pub async fn delete_user_project(&self, user_id: Uuid, project_id: Uuid) -> Result<bool> {
        let q = query(
            r#"
            MATCH (p:Project {id: $id, user_id: $user_id})
            DETACH DELETE p
            RETURN count(*) AS deleted
            "#,
        )
        .param("id", project_id.to_string())
        .param("user_id", user_id.to_string());

        let mut result = self.graph.execute(q).await?;
        let deleted = match result.next().await? {
            Some(row) => row.get::<i64>("deleted")?,
            None => 0,
        };
        Ok(deleted > 0)
    }

    pub async fn delete_user_projects(&self, user_id: Uuid) -> Result<usize> {
        let q = query(
            r#"
            MATCH (p:Project {user_id: $user_id})
            DETACH DELETE p
            RETURN count(*) AS deleted
            "#,
        )
        .param("user_id", user_id.to_string());

        let mut result = self
            .graph
            .execute(q)
            .await
            .context("Failed to delete projects")?;
        let deleted = match result.next().await? {
            Some(row) => row.get::<i64>("deleted")?,
            None => 0,
        };
        Ok(usize::try_from(deleted).unwrap_or(0))
    }

    fn node_to_project(&self, node: &neo4rs::Node) -> Result<ProjectNode> {
        let workers: i64 = node.get("workers")?;
        let profit: i64 = node.get("profit")?;
        Ok(ProjectNode {
            id: node.get::<String>("id")?.parse()?,
            user_id: node.get::<String>("user_id")?.parse()?,
            name: node.get("name")?,
            workers: u32::try_from(workers).context("Stored workers out of range")?,
            profit: u32::try_from(profit).context("Stored profit out of range")?,
            created_at: parse_timestamp(node, "created_at"),
        })
    }
}
