//! Scan lifecycle: pick a scan, re-run it, and wait for it to finish.
//!
//! A run is tracked through an [`Event`]. The event is polled at a fixed
//! interval until it becomes terminal:
//!
//! | activity | status     | outcome                      |
//! |----------|------------|------------------------------|
//! | failed   | any        | [`KdtError::ScanFailed`]     |
//! | inactive | finished   | success                      |
//! | inactive | other      | keep polling                 |
//! | active   | any        | report on change, keep going |
//!
//! Polling errors are not retried.

use std::time::Duration;

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};
use crate::models::{Activity, Event, EventStatus, Project, RestartOptions, Scan};

/// Default delay between two status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How the scan to re-run is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    /// An explicit scan id.
    Id(String),
    /// The most recent scan of `tool` in the project named `project`.
    ProjectTool {
        project: String,
        tool: String,
        branch: Option<String>,
    },
}

/// Whether to wait for the scan to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    /// Return once the server confirmed the start.
    Async,
    /// Poll until the scan finishes or fails.
    #[default]
    Block,
}

/// Result of classifying one event snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Pending,
    Finished,
    Failed,
}

/// Decide what a polled event means for the wait loop.
///
/// # Errors
///
/// Returns [`KdtError::ProtocolViolation`] for an unknown activity flag.
pub fn classify(event: &Event) -> Result<PollStep> {
    let step = match event.activity()? {
        Activity::Failed => PollStep::Failed,
        Activity::Inactive if event.lifecycle() == Some(EventStatus::Finished) => {
            PollStep::Finished
        }
        Activity::Inactive | Activity::Active => PollStep::Pending,
    };
    Ok(step)
}

/// Pick the scan to re-run for `tool` (and optionally `branch`).
///
/// The list is walked in reverse and the last match seen is kept, which is
/// the first match in server order. Kondukto returns scans newest first, so
/// this is the most recent scan of the tool. Tool and branch names are
/// compared exactly.
pub fn select_scan_for_tool<'a>(
    scans: &'a [Scan],
    tool: &str,
    branch: Option<&str>,
) -> Option<&'a Scan> {
    let mut selected = None;
    for scan in scans.iter().rev() {
        let tool_matches = scan.tool == tool;
        let branch_matches = branch.map_or(true, |b| scan.branch.as_deref() == Some(b));
        if tool_matches && branch_matches {
            selected = Some(scan);
        }
    }
    selected
}

/// A target resolved to a scan id.
#[derive(Debug, Clone)]
pub struct ResolvedScan {
    pub scan_id: String,
    /// Project looked up on the way, for project+tool targets.
    pub project: Option<Project>,
}

/// Outcome of [`ScanController::run`].
#[derive(Debug, Clone)]
pub struct ScanRun {
    /// Scan that was re-run.
    pub scan_id: String,
    /// Owning project, when it was resolved by name.
    pub project: Option<Project>,
    /// Event tracking the run.
    pub event_id: String,
    /// Final event, absent in async mode.
    pub completed: Option<Event>,
}

/// Starts scans and waits for them.
#[derive(Debug, Clone)]
pub struct ScanController<'a> {
    client: &'a KonduktoClient,
    poll_interval: Duration,
}

impl<'a> ScanController<'a> {
    pub fn new(client: &'a KonduktoClient) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Change the delay between status requests.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Resolve a target to a concrete scan.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::NotFound`] when the project does not exist or has
    /// no scan for the tool.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, target: &ScanTarget) -> Result<ResolvedScan> {
        match target {
            ScanTarget::Id(id) => {
                if id.trim().is_empty() {
                    return Err(KdtError::InvalidArgument("scan id is empty".to_string()));
                }
                Ok(ResolvedScan {
                    scan_id: id.clone(),
                    project: None,
                })
            }
            ScanTarget::ProjectTool {
                project,
                tool,
                branch,
            } => {
                let project = Project::find_by_name(self.client, project).await?;
                let scans = Scan::list_for_project(self.client, &project.id).await?;

                let scan = select_scan_for_tool(&scans, tool, branch.as_deref()).ok_or_else(
                    || KdtError::NotFound {
                        entity_type: "Scan",
                        id: format!("{tool} in project {}", project.name),
                    },
                )?;

                tracing::debug!(scan = %scan.id, project = %project.id, "selected scan");
                Ok(ResolvedScan {
                    scan_id: scan.id.clone(),
                    project: Some(project),
                })
            }
        }
    }

    /// Re-run a scan, with overrides when `options` is non-empty.
    pub async fn start(&self, scan_id: &str, options: Option<&RestartOptions>) -> Result<String> {
        match options {
            Some(options) if !options.is_empty() => {
                Scan::restart_with_options(self.client, scan_id, options).await
            }
            _ => Scan::restart(self.client, scan_id).await,
        }
    }

    /// Poll an event until it is terminal.
    ///
    /// `on_status` is called for active events only, and only when the
    /// status differs from the last one reported.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::ScanFailed`] when the run fails and propagates
    /// any polling error immediately.
    #[tracing::instrument(skip(self, on_status))]
    pub async fn wait<F>(&self, event_id: &str, mut on_status: F) -> Result<Event>
    where
        F: FnMut(&Event),
    {
        let mut last_reported: Option<i32> = None;

        loop {
            let event = Event::get_status(self.client, event_id).await?;

            match classify(&event)? {
                PollStep::Failed => {
                    tracing::error!(event = %event.id, message = %event.message, "scan failed");
                    return Err(KdtError::ScanFailed {
                        event_id: event.id,
                        message: event.message,
                    });
                }
                PollStep::Finished => {
                    tracing::info!(event = %event.id, scan = %event.scan_id, "scan finished");
                    return Ok(event);
                }
                PollStep::Pending => {
                    let active = matches!(event.activity(), Ok(Activity::Active));
                    if active && last_reported != Some(event.status) {
                        last_reported = Some(event.status);
                        on_status(&event);
                    }
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Resolve, start and (in [`WaitMode::Block`]) wait for a scan.
    pub async fn run<F>(
        &self,
        target: &ScanTarget,
        options: Option<&RestartOptions>,
        mode: WaitMode,
        on_status: F,
    ) -> Result<ScanRun>
    where
        F: FnMut(&Event),
    {
        let ResolvedScan { scan_id, project } = self.resolve(target).await?;
        let event_id = self.start(&scan_id, options).await?;

        let completed = match mode {
            WaitMode::Async => None,
            WaitMode::Block => Some(self.wait(&event_id, on_status).await?),
        };

        Ok(ScanRun {
            scan_id,
            project,
            event_id,
            completed,
        })
    }
}
