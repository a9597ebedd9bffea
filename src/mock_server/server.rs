//! Mock Kondukto API server.
//!
//! Provides an axum-based HTTP server that simulates the Kondukto API.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;
use crate::client::TOKEN_HEADER;

/// A mock Kondukto API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_scenario()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL as the host of the `Config` under test.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        let api = Router::new()
            // Project routes
            .route(
                "/api/v2/projects",
                get(handlers::list_projects).post(handlers::create_project),
            )
            .route(
                "/api/v2/projects/:id",
                get(handlers::get_project).patch(handlers::update_project),
            )
            .route(
                "/api/v2/projects/:id/release",
                get(handlers::get_release_status),
            )
            // Scan routes
            .route("/api/v2/scans", get(handlers::list_scans))
            .route("/api/v2/scans/:id", get(handlers::get_scan))
            .route("/api/v2/scans/:id/restart", post(handlers::restart_scan))
            .route(
                "/api/v2/scans/:id/restart_with_option",
                post(handlers::restart_scan),
            )
            // Event routes
            .route("/api/v2/events/:id/status", get(handlers::get_event_status))
            // Organisation routes
            .route("/api/v2/teams", get(handlers::list_teams))
            .route("/api/v2/labels", get(handlers::list_labels))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_token,
            ));

        api
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Reject API requests without the configured token.
async fn require_token(
    State(state): State<Arc<RwLock<MockState>>>,
    request: Request,
    next: Next,
) -> Response {
    let required = state.read().await.required_token.clone();

    if let Some(token) = required {
        let given = request
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if given != Some(token.as_str()) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "message": "invalid token" })),
            )
                .into_response();
        }
    }

    next.run(request).await
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
