//! Scan model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};
use crate::models::param_tree::ParamValue;
use crate::pagination::{Page, PaginationParams};
use crate::traits::{Get, List};

/// A completed (or running) scan of a project.
///
/// Scans are created by the server; the client only reads them and asks for
/// re-runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub branch: Option<String>,

    /// Scanner that produced this scan (e.g. "semgrep", "trivy").
    #[serde(default)]
    pub tool: String,

    /// Free-form metadata attached by the pipeline that triggered the scan.
    #[serde(default)]
    pub meta_data: Option<String>,

    #[serde(default)]
    pub summary: SeveritySummary,

    /// Risk score computed by Kondukto.
    #[serde(default)]
    pub score: u32,

    /// Completion time.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Vulnerability counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    #[serde(default)]
    pub critical: u32,
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
    #[serde(default)]
    pub info: u32,
}

impl SeveritySummary {
    /// Total number of findings. Saturates instead of overflowing.
    pub fn total(&self) -> u32 {
        [self.high, self.medium, self.low, self.info]
            .into_iter()
            .fold(self.critical, u32::saturating_add)
    }
}

/// Query parameters for listing scans.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanListQuery {
    /// Project id. Required.
    pub project: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Overrides applied when re-running a scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomParams>,
}

impl RestartOptions {
    /// True when no override is set.
    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.custom.is_none()
    }
}

/// Scanner-specific parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomParams {
    #[serde(default)]
    pub params: ParamValue,
}

#[derive(Debug, Deserialize)]
struct ScanListResponse {
    #[serde(default)]
    scans: Vec<Scan>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RestartResponse {
    #[serde(default)]
    event: String,
}

impl Scan {
    /// List every scan of a project, in server order.
    pub async fn list_for_project(client: &KonduktoClient, project_id: &str) -> Result<Vec<Self>> {
        let query = ScanListQuery {
            project: project_id.to_string(),
            ..Default::default()
        };
        Self::list_all(client, &query).await
    }

    /// Re-run an existing scan and return the event id tracking it.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::Upstream`] unless the server answers 201 with a
    /// non-empty event id.
    #[tracing::instrument(skip(client))]
    pub async fn restart(client: &KonduktoClient, scan_id: &str) -> Result<String> {
        let path = format!("api/v2/scans/{}/restart", urlencoding::encode(scan_id));
        let response = client.post(&path, &serde_json::json!({})).await?;
        Self::event_from(response).await
    }

    /// Re-run a scan with a different branch or custom parameters.
    #[tracing::instrument(skip(client, options))]
    pub async fn restart_with_options(
        client: &KonduktoClient,
        scan_id: &str,
        options: &RestartOptions,
    ) -> Result<String> {
        let path = format!(
            "api/v2/scans/{}/restart_with_option",
            urlencoding::encode(scan_id)
        );
        let response = client.post(&path, options).await?;
        Self::event_from(response).await
    }

    async fn event_from(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(KdtError::Upstream {
                message: format!("scan was not started: expected HTTP 201, got {status}"),
                status_code: Some(status.as_u16()),
            });
        }

        let body: RestartResponse = KonduktoClient::json(response).await?;
        if body.event.is_empty() {
            return Err(KdtError::Upstream {
                message: "scan was started but no event id was returned".to_string(),
                status_code: Some(status.as_u16()),
            });
        }

        tracing::info!(event = %body.event, "scan started");
        Ok(body.event)
    }
}

#[async_trait]
impl Get for Scan {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &KonduktoClient, id: String) -> Result<Self> {
        let path = format!("api/v2/scans/{}", urlencoding::encode(&id));

        let response = client.get(&path).await?;
        KonduktoClient::json(response).await
    }
}

#[async_trait]
impl List for Scan {
    type Query = ScanListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &KonduktoClient,
        query: &Self::Query,
        start: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        if query.project.is_empty() {
            return Err(KdtError::InvalidArgument(
                "a project id is required to list scans".to_string(),
            ));
        }

        #[derive(Serialize)]
        struct RequestParams<'a> {
            #[serde(flatten)]
            query: &'a ScanListQuery,
            #[serde(flatten)]
            page: PaginationParams,
        }

        let params = RequestParams {
            query,
            page: PaginationParams::at(start, limit),
        };

        let response = client.get_with_query("api/v2/scans", &params).await?;
        let data: ScanListResponse = KonduktoClient::json(response).await?;

        Ok(Page::new(data.scans, start, limit, data.total))
    }
}
