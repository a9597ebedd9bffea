//! Product model and trait implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};
use crate::pagination::{Page, PaginationParams};
use crate::traits::{Create, List};

/// A product: a named group of projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub projects_count: u32,
    #[serde(default)]
    pub links: Option<crate::models::project::ProjectLinks>,
}

/// Query parameters for listing products.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductListQuery {
    /// Filter by product name (partial match).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Reference to a project by id, as accepted by product endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
}

/// Parameters for creating a product.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductCreateParams {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectRef>,
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    total: Option<u64>,
}

#[async_trait]
impl List for Product {
    type Query = ProductListQuery;

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
            query: &'a ProductListQuery,
            #[serde(flatten)]
            page: PaginationParams,
        }

        let params = RequestParams {
            query,
            page: PaginationParams::at(start, limit),
        };

        let response = client.get_with_query("api/v2/products", &params).await?;
        let data: ProductListResponse = KonduktoClient::json(response).await?;

        Ok(Page::new(data.products, start, limit, data.total))
    }
}

#[async_trait]
impl Create for Product {
    type Params = ProductCreateParams;

    #[tracing::instrument(skip(client, params), fields(name = %params.name))]
    async fn create(client: &KonduktoClient, params: &Self::Params) -> Result<Self> {
        if params.name.trim().is_empty() {
            return Err(KdtError::InvalidArgument(
                "product name must not be empty".to_string(),
            ));
        }

        let response = client.post("api/v2/products", params).await?;
        KonduktoClient::json(response).await
    }
}
