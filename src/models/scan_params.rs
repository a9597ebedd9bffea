//! Scan parameters: per-project scanner configurations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};
use crate::models::scan::CustomParams;
use crate::pagination::{Page, PaginationParams};
use crate::traits::{Create, List};

/// A stored scanner configuration for a project and branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanParams {
    pub id: String,
    pub tool: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub custom: Option<CustomParams>,
}

/// Query for listing scan parameters of one project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanParamsQuery {
    /// Project id. Required, sent in the path.
    #[serde(skip)]
    pub project: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Parameters for storing a new scanner configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanParamsCreate {
    /// Project id. Sent in the path.
    #[serde(skip)]
    pub project: String,

    pub tool: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomParams>,
}

#[derive(Debug, Deserialize)]
struct ScanParamsListResponse {
    #[serde(default)]
    data: Vec<ScanParams>,
    #[serde(default)]
    total: Option<u64>,
}

fn params_path(project: &str) -> Result<String> {
    if project.is_empty() {
        return Err(KdtError::InvalidArgument(
            "a project id is required for scan parameters".to_string(),
        ));
    }
    Ok(format!(
        "api/v2/projects/{}/scanparams",
        urlencoding::encode(project)
    ))
}

#[async_trait]
impl List for ScanParams {
    type Query = ScanParamsQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &KonduktoClient,
        query: &Self::Query,
        start: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        #[derive(Serialize)]
        struct RequestParams<'a> {
            #[serde(flatten)]
            query: &'a ScanParamsQuery,
            #[serde(flatten)]
            page: PaginationParams,
        }

        let path = params_path(&query.project)?;
        let params = RequestParams {
            query,
            page: PaginationParams::at(start, limit),
        };

        let response = client.get_with_query(&path, &params).await?;
        let data: ScanParamsListResponse = KonduktoClient::json(response).await?;

        Ok(Page::new(data.data, start, limit, data.total))
    }
}

#[async_trait]
impl Create for ScanParams {
    type Params = ScanParamsCreate;

    #[tracing::instrument(skip(client, params), fields(project = %params.project, tool = %params.tool))]
    async fn create(client: &KonduktoClient, params: &Self::Params) -> Result<Self> {
        if params.tool.is_empty() {
            return Err(KdtError::InvalidArgument(
                "a tool is required for scan parameters".to_string(),
            ));
        }

        let path = params_path(&params.project)?;
        let response = client.post(&path, params).await?;
        KonduktoClient::json(response).await
    }
}
