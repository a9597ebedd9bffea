//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the kdt binary.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigOverrides, HOST_ENV, INSECURE_ENV, TOKEN_ENV};
use crate::error::{KdtError, Result};
use crate::import::EndpointFormat;
use crate::lifecycle::{ScanTarget, WaitMode};
use crate::models::{CustomParams, ParamValue, RestartOptions, ToolCategory};
use crate::thresholds::SeverityThresholds;

/// Exit status for a release gate that failed.
pub const EXIT_RELEASE_FAILED: u8 = 7;

/// Exit status for a finished scan above a severity threshold.
pub const EXIT_THRESHOLD_FAILED: u8 = 8;

/// Verdict of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ReleaseFailed,
    ThresholdFailed,
}

impl Outcome {
    /// Combine with a later check. The first failure decides the exit status,
    /// so a threshold breach reported before the release check keeps exit 8.
    #[must_use]
    pub fn then(self, next: Outcome) -> Outcome {
        match self {
            Outcome::Success => next,
            failed => failed,
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::ReleaseFailed => EXIT_RELEASE_FAILED,
            Outcome::ThresholdFailed => EXIT_THRESHOLD_FAILED,
        }
    }
}

/// Kondukto command-line interface.
#[derive(Parser, Debug)]
#[command(name = "kdt", about = "Kondukto command-line client", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Kondukto base URL.
    #[arg(long, global = true, env = HOST_ENV)]
    pub host: Option<String>,

    /// API token.
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Skip TLS certificate verification. `--insecure=false` overrides the config file.
    #[arg(
        long,
        global = true,
        env = INSECURE_ENV,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub insecure: Option<bool>,

    /// Config file (defaults to ~/.kdt.yaml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Connection settings given on the command line or in the environment.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            token: self.token.clone(),
            insecure: self.insecure,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage products.
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// List teams.
    Teams,

    /// List labels.
    Labels,

    /// List, start and follow scans.
    Scan {
        #[command(subcommand)]
        action: ScanAction,
    },

    /// Check a project's release criteria.
    Release(ReleaseArgs),

    /// Manage per-project scanner parameters.
    Scanparams {
        #[command(subcommand)]
        action: ScanParamsAction,
    },

    /// Import a software bill of materials.
    Sbom {
        #[command(subcommand)]
        action: SbomAction,
    },

    /// Import API endpoint definitions.
    Endpoint {
        #[command(subcommand)]
        action: EndpointAction,
    },

    /// Print the version and check for updates.
    Version {
        /// Do not contact GitHub.
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// List projects.
    List {
        /// Filter by name (partial match).
        #[arg(long)]
        name: Option<String>,

        /// Filter by ALM tool.
        #[arg(long)]
        alm: Option<String>,
    },

    /// Show a project by exact name.
    Show {
        name: String,
    },

    /// Create a project.
    Create {
        name: String,

        /// ALM tool the repository lives on.
        #[arg(long, default_value = "none")]
        alm_tool: String,

        /// Repository URL or identifier.
        #[arg(long)]
        repo: Option<String>,

        /// Owning team.
        #[arg(long)]
        team: Option<String>,

        /// Labels, comma separated.
        #[arg(long, value_delimiter = ',')]
        labels: Vec<String>,

        #[arg(long)]
        default_branch: Option<String>,
    },

    /// Update a project identified by exact name.
    Update {
        name: String,

        #[arg(long)]
        rename: Option<String>,

        #[arg(long)]
        default_branch: Option<String>,

        #[arg(long)]
        team: Option<String>,

        /// Replace labels, comma separated.
        #[arg(long, value_delimiter = ',')]
        labels: Option<Vec<String>>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductAction {
    /// List products.
    List {
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a product from existing projects.
    Create {
        name: String,

        /// Project names, comma separated.
        #[arg(long, value_delimiter = ',')]
        projects: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScanAction {
    /// List the scans of a project.
    List {
        /// Project name.
        project: String,
    },

    /// Re-run a scan.
    Start(ScanStartArgs),

    /// Show the state of a scan event.
    Status {
        event_id: String,
    },

    /// Show a scan.
    Show {
        scan_id: String,
    },
}

/// Arguments of `scan start`.
#[derive(Args, Debug, Default)]
pub struct ScanStartArgs {
    /// Scan to re-run.
    #[arg(long, conflicts_with_all = ["project", "tool"])]
    pub scan_id: Option<String>,

    /// Project name; re-runs the latest scan of --tool.
    #[arg(short, long, requires = "tool")]
    pub project: Option<String>,

    /// Scanner name.
    #[arg(short, long, requires = "project")]
    pub tool: Option<String>,

    /// Branch to match and scan.
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Return once the scan is started.
    #[arg(long = "async")]
    pub async_mode: bool,

    /// Custom scanner parameter, `key.path=value`. Repeatable.
    #[arg(long = "param")]
    pub params: Vec<String>,

    /// Fail when critical findings exceed this count.
    #[arg(long)]
    pub threshold_crit: Option<u32>,

    /// Fail when high findings exceed this count.
    #[arg(long)]
    pub threshold_high: Option<u32>,

    /// Fail when medium findings exceed this count.
    #[arg(long)]
    pub threshold_med: Option<u32>,

    /// Fail when low findings exceed this count.
    #[arg(long)]
    pub threshold_low: Option<u32>,

    /// Fail when the risk score exceeds this value.
    #[arg(long)]
    pub threshold_risk: Option<u32>,

    /// Check the project's release criteria after the scan.
    #[arg(long, requires = "project", conflicts_with = "scan_id")]
    pub release_check: bool,

    /// Restrict the release check to these categories. Repeatable.
    #[arg(long = "release-category", value_enum)]
    pub release_categories: Vec<ToolCategory>,
}

impl ScanStartArgs {
    /// Which scan to re-run.
    ///
    /// Rejects a release check without a project before anything is started.
    pub fn target(&self) -> Result<ScanTarget> {
        if self.release_check && self.project.is_none() {
            return Err(KdtError::InvalidArgument(
                "--release-check needs --project".to_string(),
            ));
        }
        match (&self.scan_id, &self.project, &self.tool) {
            (Some(id), _, _) => Ok(ScanTarget::Id(id.clone())),
            (None, Some(project), Some(tool)) => Ok(ScanTarget::ProjectTool {
                project: project.clone(),
                tool: tool.clone(),
                branch: self.branch.clone(),
            }),
            _ => Err(KdtError::InvalidArgument(
                "either --scan-id or --project with --tool is required".to_string(),
            )),
        }
    }

    pub fn wait_mode(&self) -> WaitMode {
        if self.async_mode {
            WaitMode::Async
        } else {
            WaitMode::Block
        }
    }

    pub fn thresholds(&self) -> SeverityThresholds {
        SeverityThresholds {
            critical: self.threshold_crit,
            high: self.threshold_high,
            medium: self.threshold_med,
            low: self.threshold_low,
            risk: self.threshold_risk,
        }
    }

    /// Overrides to send with the restart, if any.
    pub fn restart_options(&self) -> Result<Option<RestartOptions>> {
        let custom = if self.params.is_empty() {
            None
        } else {
            Some(CustomParams {
                params: ParamValue::from_assignments(&self.params)?,
            })
        };

        // The branch only selects the scan when re-running by project and tool
        let branch = match self.scan_id {
            Some(_) => self.branch.clone(),
            None => None,
        };

        let options = RestartOptions { branch, custom };
        Ok((!options.is_empty()).then_some(options))
    }
}

/// Arguments of `release`.
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Project name.
    pub project: String,

    /// Only these categories decide the verdict. Repeatable.
    #[arg(long = "category", value_enum)]
    pub categories: Vec<ToolCategory>,

    /// Fetch and show the scans behind failing categories.
    #[arg(long)]
    pub details: bool,
}

#[derive(Subcommand, Debug)]
pub enum ScanParamsAction {
    /// List scanner parameters of a project.
    List {
        /// Project name.
        project: String,

        #[arg(long)]
        tool: Option<String>,

        #[arg(long)]
        branch: Option<String>,
    },

    /// Store scanner parameters for a project.
    Create {
        /// Project name.
        project: String,

        #[arg(long)]
        tool: String,

        #[arg(long)]
        branch: Option<String>,

        /// Custom parameter, `key.path=value`. Repeatable.
        #[arg(long = "param")]
        params: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SbomAction {
    /// Upload an SBOM file.
    Import {
        /// SBOM file (CycloneDX or SPDX).
        #[arg(short, long)]
        file: PathBuf,

        /// Project name.
        #[arg(short, long)]
        project: String,

        #[arg(short, long)]
        branch: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum EndpointAction {
    /// Upload an API definition.
    Import {
        #[arg(short, long)]
        file: PathBuf,

        /// Project name.
        #[arg(short, long)]
        project: String,

        #[arg(long, value_enum, default_value = "openapi")]
        format: EndpointFormat,

        #[arg(short, long)]
        branch: Option<String>,
    },
}
