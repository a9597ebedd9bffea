//! Release criteria status of a project.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};

/// Status string meaning a category or the whole gate failed.
pub const STATUS_FAIL: &str = "fail";

/// Status string meaning no release criteria are configured.
pub const STATUS_UNDEFINED: &str = "undefined";

/// Scan tool categories covered by release criteria.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ToolCategory {
    Sast,
    Dast,
    Pentest,
    Iast,
    Sca,
    Cs,
    Iac,
}

impl ToolCategory {
    /// Every category, in report order.
    pub const ALL: [ToolCategory; 7] = [
        Self::Sast,
        Self::Dast,
        Self::Pentest,
        Self::Iast,
        Self::Sca,
        Self::Cs,
        Self::Iac,
    ];

    /// Upper-case name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sast => "SAST",
            Self::Dast => "DAST",
            Self::Pentest => "PENTEST",
            Self::Iast => "IAST",
            Self::Sca => "SCA",
            Self::Cs => "CS",
            Self::Iac => "IAC",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolCategory {
    type Err = KdtError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| KdtError::InvalidArgument(format!("unknown tool category '{s}'")))
    }
}

/// Status of a single category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStatus {
    #[serde(default)]
    pub status: String,

    /// Scan that caused a failure, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,
}

impl CategoryStatus {
    pub fn is_fail(&self) -> bool {
        self.status == STATUS_FAIL
    }
}

/// Aggregated release criteria status, computed by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStatus {
    pub status: String,
    #[serde(default, alias = "SAST")]
    pub sast: CategoryStatus,
    #[serde(default, alias = "DAST")]
    pub dast: CategoryStatus,
    #[serde(default, alias = "PENTEST")]
    pub pentest: CategoryStatus,
    #[serde(default, alias = "IAST")]
    pub iast: CategoryStatus,
    #[serde(default, alias = "SCA")]
    pub sca: CategoryStatus,
    #[serde(default, alias = "CS")]
    pub cs: CategoryStatus,
    #[serde(default, alias = "IAC")]
    pub iac: CategoryStatus,
}

impl ReleaseStatus {
    /// Sub-status of one category.
    pub fn category(&self, category: ToolCategory) -> &CategoryStatus {
        match category {
            ToolCategory::Sast => &self.sast,
            ToolCategory::Dast => &self.dast,
            ToolCategory::Pentest => &self.pentest,
            ToolCategory::Iast => &self.iast,
            ToolCategory::Sca => &self.sca,
            ToolCategory::Cs => &self.cs,
            ToolCategory::Iac => &self.iac,
        }
    }

    /// True when the project has no release criteria.
    pub fn is_undefined(&self) -> bool {
        self.status == STATUS_UNDEFINED
    }

    /// Fetch the release status of a project.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::NotFound`] for an empty project id and
    /// [`KdtError::Upstream`] on a non-2xx response.
    #[tracing::instrument(skip(client))]
    pub async fn get(client: &KonduktoClient, project_id: &str) -> Result<Self> {
        if project_id.trim().is_empty() {
            return Err(KdtError::NotFound {
                entity_type: "Project",
                id: String::new(),
            });
        }

        let path = format!("api/v2/projects/{}/release", urlencoding::encode(project_id));
        let response = client.get(&path).await?;
        KonduktoClient::json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("sast".parse::<ToolCategory>().unwrap(), ToolCategory::Sast);
        assert_eq!("IaC".parse::<ToolCategory>().unwrap(), ToolCategory::Iac);
        assert!("fuzz".parse::<ToolCategory>().is_err());
    }

    #[test]
    fn test_deserialize_upper_case_keys() {
        let status: ReleaseStatus = serde_json::from_value(serde_json::json!({
            "status": "fail",
            "SAST": { "status": "fail", "scan_id": "s-1" },
            "DAST": { "status": "pass" }
        }))
        .unwrap();

        assert!(status.category(ToolCategory::Sast).is_fail());
        assert_eq!(status.sast.scan_id.as_deref(), Some("s-1"));
        assert!(!status.category(ToolCategory::Dast).is_fail());
        assert_eq!(status.iac, CategoryStatus::default());
    }
}
