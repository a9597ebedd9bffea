//! Event endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tokio::sync::RwLock;

use super::not_found;
use crate::mock_server::state::MockState;

/// GET /api/v2/events/{id}/status
pub async fn get_event_status(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    match state.poll_event(&id) {
        Some(event) => (StatusCode::OK, Json(event)).into_response(),
        None => not_found("Event", &id),
    }
}
