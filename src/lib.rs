//! Kondukto API client library.
//!
//! A Rust library and CLI for the Kondukto security orchestration API,
//! built around a trait-based architecture where each operation (Get, List,
//! Create, Update) is a trait that entity types implement.
//!
//! # Quick Start
//!
//! ```no_run
//! use kdt::{Config, KonduktoClient, Project};
//!
//! #[tokio::main]
//! async fn main() -> kdt::Result<()> {
//!     let config = Config::new("https://kondukto.example.com", "my-token")?;
//!     let client = KonduktoClient::new(&config)?;
//!
//!     // Resolve a project by exact name
//!     let project = Project::find_by_name(&client, "payments").await?;
//!
//!     // Check its release criteria
//!     let verdict = kdt::release::evaluate(&client, &project.id, &[]).await?;
//!     println!("passed: {}", verdict.passed);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`KonduktoClient`] - authenticated transport shared by every call
//! - [`Get`], [`List`], [`Create`], [`Update`] - resource operations
//! - [`lifecycle`] - re-run a scan and wait for it to finish
//! - [`release`] - evaluate a project's release gate
//!
//! # Configuration
//!
//! [`Config`] is built explicitly, usually by [`Config::resolve`] from CLI
//! flags, `KONDUKTO_HOST` / `KONDUKTO_TOKEN` / `KONDUKTO_INSECURE` and
//! `~/.kdt.yaml`, in that order of precedence.

pub mod cli;
mod client;
pub mod config;
mod error;
pub mod import;
pub mod lifecycle;
#[cfg(feature = "test-server")]
pub mod mock_server;
mod models;
mod output;
mod pagination;
pub mod release;
pub mod thresholds;
mod traits;
pub mod update_check;

// Re-export core types
pub use client::KonduktoClient;
pub use config::Config;
pub use error::{KdtError, Result};
pub use output::PrettyPrint;
pub use pagination::{Page, PaginationParams};

// Re-export traits
pub use traits::{Create, Get, List, Update, DEFAULT_PAGE_SIZE};

// Re-export models
pub use models::{
    // Project types
    Project,
    ProjectCreateParams,
    ProjectLinks,
    ProjectListQuery,
    ProjectSource,
    ProjectUpdateParams,
    // Organisation types
    Label,
    Product,
    ProductCreateParams,
    ProductListQuery,
    ProjectRef,
    Team,
    TeamListQuery,
    // Scan types
    CustomParams,
    RestartOptions,
    Scan,
    ScanListQuery,
    ScanParams,
    ScanParamsCreate,
    ScanParamsQuery,
    SeveritySummary,
    // Event types
    Activity,
    Event,
    EventStatus,
    // Release types
    CategoryStatus,
    ReleaseStatus,
    ToolCategory,
    // Parameter trees
    parse_assignment,
    ParamValue,
    Scalar,
};
