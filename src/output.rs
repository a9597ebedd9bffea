//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::release::Verdict;
use crate::thresholds::ThresholdBreach;
use crate::{Event, Project, Scan};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let header = format!("Project: {}", self.name);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider, format!("ID:             {}", self.id)];

        if let Some(ref branch) = self.default_branch {
            lines.push(format!("Default Branch: {}", branch));
        }

        if let Some(ref team) = self.team {
            lines.push(format!("Team:           {}", team.name));
        }

        if !self.labels.is_empty() {
            lines.push(format!("Labels:         {}", self.label_names().join(", ")));
        }

        if let Some(ref alm) = self.alm_tool {
            lines.push(format!("ALM:            {}", alm));
        }

        if let Some(link) = self.ui_link() {
            lines.push(format!("Link:           {}", link));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Scan {
    fn pretty_print(&self) -> String {
        let header = format!("Scan: {}", self.id);
        let divider = "─".repeat(header.len().max(30));
        let s = &self.summary;

        let mut lines = vec![
            header,
            divider,
            format!("Tool:           {}", self.tool),
        ];

        if !self.name.is_empty() {
            lines.push(format!("Name:           {}", self.name));
        }

        if let Some(ref branch) = self.branch {
            lines.push(format!("Branch:         {}", branch));
        }

        lines.push(format!(
            "Findings:       {} ({} critical, {} high, {} medium, {} low, {} info)",
            s.total(),
            s.critical,
            s.high,
            s.medium,
            s.low,
            s.info
        ));
        lines.push(format!("Risk Score:     {}", self.score));

        if let Some(ref date) = self.date {
            lines.push(format!("Completed:      {}", date.format("%Y-%m-%d %H:%M:%S UTC")));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Event {
    fn pretty_print(&self) -> String {
        let mut line = format!("[{}] {}", self.id, self.status_label());
        if !self.message.is_empty() {
            line.push_str(": ");
            line.push_str(&self.message);
        }
        line
    }
}

impl PrettyPrint for Verdict {
    fn pretty_print(&self) -> String {
        if self.undefined {
            return "Release criteria: not configured (pass)".to_string();
        }

        let mut lines = vec![format!(
            "Release criteria: {}",
            if self.passed { "PASS" } else { "FAIL" }
        )];

        for failing in &self.failing {
            lines.push(format!(
                "  {:<8} fail  {}",
                failing.category.as_str(),
                failing.scan_id.as_deref().unwrap_or("-")
            ));
        }

        for ignored in &self.ignored {
            lines.push(format!(
                "  {:<8} fail  (not checked)",
                ignored.category.as_str()
            ));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for [ThresholdBreach] {
    fn pretty_print(&self) -> String {
        if self.is_empty() {
            return "Thresholds: PASS".to_string();
        }
        let mut lines = vec!["Thresholds: FAIL".to_string()];
        lines.extend(self.iter().map(|b| format!("  {b}")));
        lines.join("\n")
    }
}
