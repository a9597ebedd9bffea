//! Team and label endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tokio::sync::RwLock;

use super::PageQuery;
use crate::mock_server::state::MockState;

/// GET /api/v2/teams
pub async fn list_teams(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(page): Query<PageQuery>,
) -> impl IntoResponse {
    let state = state.read().await;

    let all: Vec<_> = state.teams.iter().collect();
    let teams = page.apply(&all);

    (
        StatusCode::OK,
        Json(serde_json::json!({ "teams": teams, "total": all.len() })),
    )
}

/// GET /api/v2/labels
pub async fn list_labels(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(page): Query<PageQuery>,
) -> impl IntoResponse {
    let state = state.read().await;

    let all: Vec<_> = state.labels.iter().collect();
    let labels = page.apply(&all);

    (
        StatusCode::OK,
        Json(serde_json::json!({ "labels": labels, "total": all.len() })),
    )
}
