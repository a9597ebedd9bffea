//! Mock Kondukto API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Kondukto
//! API for integration and end-to-end testing. Unlike wiremock which mocks at
//! the HTTP level per-test, this server maintains state across requests, so a
//! created project shows up in later listings and a restarted scan walks
//! through its scripted event snapshots.
//!
//! # Example
//!
//! ```ignore
//! use kdt::mock_server::MockServer;
//! use kdt::{Config, KonduktoClient, Project};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let config = Config::new(server.url(), "test-token").unwrap();
//!     let client = KonduktoClient::new(&config).unwrap();
//!
//!     // Server comes with default fixtures
//!     let project = Project::find_by_name(&client, "payments").await.unwrap();
//!     assert_eq!(project.id, "proj-payments");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::{snapshot, MockState};
