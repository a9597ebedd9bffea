//! Team model and trait implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::Result;
use crate::pagination::{Page, PaginationParams};
use crate::traits::List;

/// A Kondukto team.
///
/// Also used as the team reference embedded in projects, where only the name
/// may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
}

impl Team {
    /// Reference a team by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
        }
    }
}

/// Query parameters for listing teams.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamListQuery {
    /// Filter by team name (partial match).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamListResponse {
    #[serde(default)]
    teams: Vec<Team>,
    #[serde(default)]
    total: Option<u64>,
}

#[async_trait]
impl List for Team {
    type Query = TeamListQuery;

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
            query: &'a TeamListQuery,
            #[serde(flatten)]
            page: PaginationParams,
        }

        let params = RequestParams {
            query,
            page: PaginationParams::at(start, limit),
        };

        let response = client.get_with_query("api/v2/teams", &params).await?;
        let data: TeamListResponse = KonduktoClient::json(response).await?;

        Ok(Page::new(data.teams, start, limit, data.total))
    }
}
