//! Project API handlers: CRUD over the caller's projects and the
//! knapsack comparison search.

use super::handlers::{AppError, Flash, SharedState};
use crate::auth::extractor::AuthUser;
use crate::neo4j::models::ProjectNode;
use crate::solver::{self, Comparison, Item};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

const INVALID_INPUT: &str = "Invalid input!";

// ============================================================================
// Request/Response types
// ============================================================================

/// Fields are optional so that a missing field is reported the same way as
/// a bad value.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub workers: Option<i64>,
    #[serde(default)]
    pub profit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub worker_limit: i64,
}

#[derive(Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub project_name: String,
    pub workers: u32,
    pub profit: u32,
    pub created_at: String,
}

impl From<ProjectNode> for ProjectResponse {
    fn from(p: ProjectNode) -> Self {
        Self {
            id: p.id,
            project_name: p.name,
            workers: p.workers,
            profit: p.profit,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectResponse>,
    pub total: usize,
    pub total_workers: u64,
    pub total_profit: u64,
}

#[derive(Serialize)]
pub struct CreateProjectResponse {
    pub project: ProjectResponse,
    pub flash: Flash,
}

#[derive(Serialize)]
pub struct DeleteProjectsResponse {
    pub deleted: usize,
    pub flash: Flash,
}

/// Malformed bodies (wrong types, bad JSON) get the same answer as bad values.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!("Rejected body: {}", rejection.body_text());
            Err(AppError::BadRequest(INVALID_INPUT.to_string()))
        }
    }
}

/// A positive value that fits the stored `u32` range.
fn positive(value: Option<i64>) -> Option<u32> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

impl CreateProjectRequest {
    fn validate(self) -> Result<(String, u32, u32), AppError> {
        let invalid = || AppError::BadRequest(INVALID_INPUT.to_string());

        let name = self
            .project_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(invalid)?;
        let workers = positive(self.workers).ok_or_else(invalid)?;
        let profit = positive(self.profit).ok_or_else(invalid)?;

        Ok((name, workers, profit))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/projects: the caller's projects, oldest first
pub async fn list_projects(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<ProjectListResponse>, AppError> {
    let projects = state.neo4j.list_user_projects(user.user_id).await?;

    let total_workers = projects.iter().map(|p| u64::from(p.workers)).sum();
    let total_profit = projects.iter().map(|p| u64::from(p.profit)).sum();

    Ok(Json(ProjectListResponse {
        total: projects.len(),
        total_workers,
        total_profit,
        projects: projects.into_iter().map(ProjectResponse::from).collect(),
    }))
}

/// POST /api/projects: record a project
pub async fn create_project(
    State(state): State<SharedState>,
    user: AuthUser,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), AppError> {
    let (name, workers, profit) = json_body(payload)?.validate()?;

    let project = ProjectNode::new(user.user_id, name, workers, profit);
    state.neo4j.create_project(&project).await?;

    tracing::info!(
        user_id = %user.user_id,
        project_id = %project.id,
        workers,
        profit,
        "Project added"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            project: ProjectResponse::from(project),
            flash: Flash::success("Project added!"),
        }),
    ))
}

/// DELETE /api/projects: remove all of the caller's projects
pub async fn delete_projects(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<DeleteProjectsResponse>, AppError> {
    let deleted = state
        .neo4j
        .delete_user_projects(user.user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.user_id, "Failed to delete projects: {:#}", e);
            AppError::Internal(anyhow::anyhow!("An error occurred while deleting projects."))
        })?;

    tracing::info!(user_id = %user.user_id, deleted, "Projects deleted");

    Ok(Json(DeleteProjectsResponse {
        deleted,
        flash: Flash::success("All projects deleted successfully!"),
    }))
}

/// DELETE /api/projects/{project_id}: remove one owned project
pub async fn delete_project(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state
        .neo4j
        .delete_user_project(user.user_id, project_id)
        .await?
    {
        tracing::info!(user_id = %user.user_id, %project_id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Project not found".to_string()))
    }
}

/// POST /api/projects/search: best subset within `worker_limit`, solved
/// by brute force and by greedy
pub async fn search_projects(
    State(state): State<SharedState>,
    user: AuthUser,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Comparison>, AppError> {
    let worker_limit = json_body(payload)?.worker_limit;
    // Stored workers are at least 1, so any negative limit selects nothing,
    // exactly as 0 does. Limits past u32::MAX fit everything, as u32::MAX does.
    let capacity = u32::try_from(worker_limit.max(0)).unwrap_or(u32::MAX);

    let items: Vec<Item> = state
        .neo4j
        .list_user_projects(user.user_id)
        .await?
        .iter()
        .map(ProjectNode::to_item)
        .collect();

    let limits = state.limits;
    let started = Instant::now();
    let mut comparison =
        tokio::task::spawn_blocking(move || solver::compare(items, capacity, limits))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Solver task failed: {}", e)))??;
    comparison.worker_limit = worker_limit;

    tracing::debug!(
        user_id = %user.user_id,
        worker_limit,
        candidates = comparison.candidates,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Knapsack comparison computed"
    );

    Ok(Json(comparison))
}
