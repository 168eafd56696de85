//! Project Knapsack
//!
//! An authenticated service where users record projects (name, workers,
//! profit) and ask for the most profitable subset that fits a worker limit:
//! - Neo4j storage for users and their projects
//! - JWT sessions (Bearer header or `session` cookie)
//! - Exact brute-force and greedy knapsack solvers, compared side by side

pub mod api;
pub mod auth;
pub mod neo4j;
pub mod solver;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Minimum length accepted for `auth.jwt_secret`.
pub const MIN_JWT_SECRET_LEN: usize = 32;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub solver: SolverYamlConfig,
    /// Auth section: if absent, auth_config will be None (deny-by-default)
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "knapsack123".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverYamlConfig {
    /// Largest candidate count the exhaustive solver accepts
    pub max_bruteforce_items: usize,
}

impl Default for SolverYamlConfig {
    fn default() -> Self {
        Self {
            max_bruteforce_items: solver::DEFAULT_MAX_BRUTEFORCE_ITEMS,
        }
    }
}

/// Authentication configuration for password accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret (HS256, minimum 32 characters)
    pub jwt_secret: String,
    /// JWT token lifetime in seconds (default: 28800 = 8h)
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_secs: u64,
    /// Optional domain restriction (e.g. "example.com")
    pub allowed_email_domain: Option<String>,
    /// Allow sign-up via POST /auth/register (default: true)
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_jwt_expiry() -> u64 {
    28800 // 8 hours
}

fn default_allow_registration() -> bool {
    true
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl AuthConfig {
    fn with_secret(jwt_secret: String) -> Self {
        Self {
            jwt_secret,
            jwt_expiry_secs: default_jwt_expiry(),
            allowed_email_domain: None,
            allow_registration: default_allow_registration(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }

    /// True when no domain restriction is set or `email` belongs to it.
    pub fn email_allowed(&self, email: &str) -> bool {
        match self.allowed_email_domain {
            Some(ref domain) => email
                .to_lowercase()
                .ends_with(&format!("@{}", domain.to_lowercase())),
            None => true,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub server_port: u16,
    /// Auth config: None means deny-by-default
    pub auth_config: Option<AuthConfig>,
    pub limits: solver::Limits,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. A missing file
    /// falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let mut auth_config = yaml.auth;
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            match auth_config {
                Some(ref mut auth) => auth.jwt_secret = secret,
                None => auth_config = Some(AuthConfig::with_secret(secret)),
            }
        }
        if let Some(ref auth) = auth_config {
            if auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
                anyhow::bail!(
                    "auth.jwt_secret must be at least {} characters",
                    MIN_JWT_SECRET_LEN
                );
            }
        }

        let max_bruteforce_items = match std::env::var("MAX_BRUTEFORCE_ITEMS") {
            Ok(v) => v
                .parse()
                .context("MAX_BRUTEFORCE_ITEMS must be a positive integer")?,
            Err(_) => yaml.solver.max_bruteforce_items,
        };

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            auth_config,
            limits: solver::Limits::new(max_bruteforce_items),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Connect to Neo4j and serve the API until the process is stopped.
pub async fn start_server(config: Config) -> Result<()> {
    let neo4j = Arc::new(
        neo4j::Neo4jClient::new(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
            .await?,
    );
    tracing::info!("Connected to Neo4j at {}", config.neo4j_uri);

    if config.auth_config.is_none() {
        tracing::warn!("No auth section and no JWT_SECRET: every protected route will answer 403");
    }

    let state = Arc::new(api::handlers::ServerState {
        neo4j,
        auth_config: config.auth_config,
        limits: config.limits,
    });
    let app = api::create_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")
}

// ============================================================================
// Tests
// ============================================================================
