//! Scan endpoint handlers.

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
use crate::Scan;

/// Query parameters for listing scans.
#[derive(Debug, Default, Deserialize)]
pub struct ListScansQuery {
    #[serde(default)]
    pub project: String,
    pub start: Option<usize>,
    pub limit: Option<usize>,
}

/// Response for listing scans.
#[derive(Debug, Serialize)]
pub struct ListScansResponse {
    pub scans: Vec<Scan>,
    pub total: u64,
}

/// GET /api/v2/scans?project=
pub async fn list_scans(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(query): Query<ListScansQuery>,
) -> impl IntoResponse {
    let state = state.read().await;

    let all = state.list_scans(&query.project);
    let total = all.len() as u64;
    let scans = PageQuery::new(query.start, query.limit).apply(&all);

    (StatusCode::OK, Json(ListScansResponse { scans, total }))
}

/// GET /api/v2/scans/{id}
pub async fn get_scan(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let state = state.read().await;

    match state.get_scan(&id) {
        Some(scan) => (StatusCode::OK, Json(scan.clone())).into_response(),
        None => not_found("Scan", &id),
    }
}

/// POST /api/v2/scans/{id}/restart and /restart_with_option
///
/// Overrides in the body are accepted and ignored.
pub async fn restart_scan(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    match state.restart_scan(&id) {
        Some(event) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "event": event })),
        )
            .into_response(),
        None => not_found("Scan", &id),
    }
}
