//! Release gate evaluation.
//!
//! Kondukto computes a per-category release status for each project. The
//! gate passes when none of the categories the caller cares about failed.
//! An empty restriction means every category counts.

use serde::Serialize;

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};
use crate::models::{ReleaseStatus, Scan, ToolCategory};
use crate::traits::Get;

/// A category whose release criteria failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailingCategory {
    pub category: ToolCategory,
    /// Scan that violated the criteria, when the server names one.
    pub scan_id: Option<String>,
}

impl FailingCategory {
    /// Fetch the offending scan for detailed reporting.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::NotFound`] when the server did not name a scan.
    pub async fn scan(&self, client: &KonduktoClient) -> Result<Scan> {
        let id = self.scan_id.clone().ok_or_else(|| KdtError::NotFound {
            entity_type: "Scan",
            id: format!("failing {} scan", self.category),
        })?;
        Scan::get(client, id).await
    }
}

/// Outcome of a release gate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    /// True when the project has no release criteria configured.
    pub undefined: bool,
    /// Failures that decide the verdict.
    pub failing: Vec<FailingCategory>,
    /// Failures outside the requested categories, reported for information.
    pub ignored: Vec<FailingCategory>,
}

impl Verdict {
    /// Decide the verdict for a fetched status.
    pub fn from_status(status: &ReleaseStatus, enabled: &[ToolCategory]) -> Self {
        if status.is_undefined() {
            return Self {
                passed: true,
                undefined: true,
                failing: Vec::new(),
                ignored: Vec::new(),
            };
        }

        let (failing, ignored): (Vec<_>, Vec<_>) = ToolCategory::ALL
            .into_iter()
            .filter(|c| status.category(*c).is_fail())
            .map(|category| FailingCategory {
                category,
                scan_id: status.category(category).scan_id.clone(),
            })
            .partition(|f| enabled.is_empty() || enabled.contains(&f.category));

        if failing.is_empty() && !ignored.is_empty() {
            tracing::info!(
                ignored = ?ignored.iter().map(|f| f.category.as_str()).collect::<Vec<_>>(),
                "release criteria failing outside the checked categories"
            );
        }

        Self {
            passed: failing.is_empty(),
            undefined: false,
            failing,
            ignored,
        }
    }

    /// Names of the failing categories.
    pub fn failing_names(&self) -> Vec<&'static str> {
        self.failing.iter().map(|f| f.category.as_str()).collect()
    }
}

/// Fetch the release status of a project and evaluate it.
///
/// Read-only; safe to call repeatedly.
#[tracing::instrument(skip(client))]
pub async fn evaluate(
    client: &KonduktoClient,
    project_id: &str,
    enabled: &[ToolCategory],
) -> Result<Verdict> {
    let status = ReleaseStatus::get(client, project_id).await?;
    let verdict = Verdict::from_status(&status, enabled);

    if verdict.passed {
        tracing::info!(project = project_id, "release criteria passed");
    } else {
        tracing::warn!(
            project = project_id,
            failing = ?verdict.failing_names(),
            "release criteria failed"
        );
    }

    Ok(verdict)
}
