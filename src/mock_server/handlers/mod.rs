//! HTTP request handlers for the mock server.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Deserialize;

pub mod events;
pub mod organisation;
pub mod projects;
pub mod scans;

pub use events::*;
pub use organisation::*;
pub use projects::*;
pub use scans::*;

/// Offset paging parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub start: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn new(start: Option<usize>, limit: Option<usize>) -> Self {
        Self { start, limit }
    }

    /// Slice `items` to the requested window.
    pub fn apply<T: Clone>(&self, items: &[&T]) -> Vec<T> {
        let start = self.start.unwrap_or(0).min(items.len());
        let limit = self.limit.unwrap_or(100);
        let end = start.saturating_add(limit).min(items.len());
        items[start..end].iter().map(|i| (*i).clone()).collect()
    }
}

/// 404 with a Kondukto-style error body.
pub fn not_found(entity: &str, id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": format!("{entity} not found"),
            "message": format!("No {} found with id: {}", entity.to_lowercase(), id)
        })),
    )
        .into_response()
}
