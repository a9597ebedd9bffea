//! Label model and trait implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::Result;
use crate::pagination::{Page, PaginationParams};
use crate::traits::List;

/// A project label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    /// Hex color shown in the UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Label {
    /// Reference a label by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelListResponse {
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    total: Option<u64>,
}

#[async_trait]
impl List for Label {
    type Query = ();

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &KonduktoClient,
        _query: &Self::Query,
        start: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let params = PaginationParams::at(start, limit);
        let response = client.get_with_query("api/v2/labels", &params).await?;
        let data: LabelListResponse = KonduktoClient::json(response).await?;

        Ok(Page::new(data.labels, start, limit, data.total))
    }
}
