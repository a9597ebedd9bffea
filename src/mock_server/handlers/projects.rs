//! Project endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{not_found, PageQuery};
use crate::mock_server::state::MockState;
use crate::{Label, Project, ProjectCreateParams, Team};

/// Query parameters for listing projects.
#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    pub name: Option<String>,
    pub alm: Option<String>,
    pub start: Option<usize>,
    pub limit: Option<usize>,
}

/// Response for listing projects.
#[derive(Debug, Serialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<Project>,
    pub total: u64,
}

/// Parameters for updating a project.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectParams {
    pub name: Option<String>,
    pub default_branch: Option<String>,
    pub team: Option<Team>,
    pub labels: Option<Vec<Label>>,
}

/// GET /api/v2/projects
pub async fn list_projects(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(query): Query<ListProjectsQuery>,
) -> impl IntoResponse {
    let state = state.read().await;

    let matching = state.list_projects(query.name.as_deref(), query.alm.as_deref());
    let total = matching.len() as u64;
    let projects = PageQuery::new(query.start, query.limit).apply(&matching);

    (StatusCode::OK, Json(ListProjectsResponse { projects, total }))
}

/// POST /api/v2/projects
pub async fn create_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Json(params): Json<ProjectCreateParams>,
) -> impl IntoResponse {
    if params.name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "message": "project name is required" })),
        )
            .into_response();
    }

    let mut state = state.write().await;
    let project = state.create_project(params);
    (StatusCode::CREATED, Json(project)).into_response()
}

/// GET /api/v2/projects/{id}
pub async fn get_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let state = state.read().await;

    match state.get_project(&id) {
        Some(project) => (StatusCode::OK, Json(project.clone())).into_response(),
        None => not_found("Project", &id),
    }
}

/// PATCH /api/v2/projects/{id}
pub async fn update_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Json(params): Json<UpdateProjectParams>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    match state.update_project(
        &id,
        params.name,
        params.default_branch,
        params.team,
        params.labels,
    ) {
        Some(project) => (StatusCode::OK, Json(project.clone())).into_response(),
        None => not_found("Project", &id),
    }
}

/// GET /api/v2/projects/{id}/release
pub async fn get_release_status(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let state = state.read().await;

    if state.get_project(&id).is_none() {
        return not_found("Project", &id);
    }
    (StatusCode::OK, Json(state.release_status(&id))).into_response()
}
