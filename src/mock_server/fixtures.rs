//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{TimeZone, Utc};

use super::state::{snapshot, MockState};
use crate::{CategoryStatus, Label, Project, ReleaseStatus, Scan, SeveritySummary, Team};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Project Fixtures
    // =========================================================================

    /// Create a minimal project with required fields only.
    pub fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            default_branch: None,
            team: None,
            labels: vec![],
            alm_tool: None,
            links: None,
        }
    }

    /// Create a project owned by a team, with labels.
    pub fn team_project(id: &str, name: &str, team: &str, labels: &[&str]) -> Project {
        let mut project = Self::project(id, name);
        project.default_branch = Some("main".to_string());
        project.team = Some(Team::named(team));
        project.labels = labels.iter().map(|l| Label::named(*l)).collect();
        project.alm_tool = Some("github".to_string());
        project
    }

    // =========================================================================
    // Scan Fixtures
    // =========================================================================

    /// Create a scan without findings.
    pub fn scan(id: &str, tool: &str, branch: &str) -> Scan {
        Scan {
            id: id.to_string(),
            name: format!("{tool}-{branch}"),
            branch: Some(branch.to_string()),
            tool: tool.to_string(),
            meta_data: None,
            summary: SeveritySummary::default(),
            score: 0,
            date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single(),
        }
    }

    /// Create a scan with findings and a risk score.
    pub fn scan_with_findings(
        id: &str,
        tool: &str,
        critical: u32,
        high: u32,
        medium: u32,
        low: u32,
        score: u32,
    ) -> Scan {
        let mut scan = Self::scan(id, tool, "main");
        scan.summary = SeveritySummary {
            critical,
            high,
            medium,
            low,
            info: 0,
        };
        scan.score = score;
        scan
    }

    // =========================================================================
    // Release Fixtures
    // =========================================================================

    /// Release status where only SAST fails, caused by `scan_id`.
    pub fn sast_failing_release(scan_id: &str) -> ReleaseStatus {
        let pass = CategoryStatus {
            status: "pass".to_string(),
            scan_id: None,
        };
        ReleaseStatus {
            status: "fail".to_string(),
            sast: CategoryStatus {
                status: "fail".to_string(),
                scan_id: Some(scan_id.to_string()),
            },
            dast: pass.clone(),
            pentest: pass.clone(),
            iast: pass.clone(),
            sca: pass.clone(),
            cs: pass.clone(),
            iac: pass,
        }
    }

    // =========================================================================
    // Scenario Fixtures
    // =========================================================================

    /// A small organisation used by default.
    ///
    /// - `payments` (`proj-payments`): semgrep and trivy scans, SAST release
    ///   criteria failing on the latest semgrep scan
    /// - `inventory` (`proj-inventory`): one scan, no release criteria
    pub fn default_scenario() -> MockState {
        MockState::new()
            .with_team(Team {
                id: "team-1".to_string(),
                name: "appsec".to_string(),
            })
            .with_label(Label {
                id: "label-1".to_string(),
                name: "pci".to_string(),
                color: Some("#d73a4a".to_string()),
            })
            .with_project(Self::team_project(
                "proj-payments",
                "payments",
                "appsec",
                &["pci"],
            ))
            .with_project(Self::team_project(
                "proj-inventory",
                "inventory",
                "appsec",
                &[],
            ))
            .with_scan(
                "proj-payments",
                Self::scan_with_findings("scan-semgrep-old", "semgrep", 0, 1, 3, 5, 20),
            )
            .with_scan("proj-payments", Self::scan("scan-trivy", "trivy", "main"))
            .with_scan(
                "proj-payments",
                Self::scan_with_findings("scan-semgrep", "semgrep", 1, 4, 10, 12, 65),
            )
            .with_script(
                "scan-semgrep",
                vec![
                    snapshot(0, 1, "queued"),
                    snapshot(1, 1, "scanning"),
                    snapshot(1, 1, "scanning"),
                    snapshot(2, 1, "analyzing"),
                    snapshot(4, 0, ""),
                ],
            )
            .with_scan("proj-inventory", Self::scan("scan-inventory", "gosec", "main"))
            .with_release("proj-payments", Self::sast_failing_release("scan-semgrep"))
    }
}
