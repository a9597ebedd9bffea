//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::KonduktoClient;
use crate::error::Result;
use crate::pagination::Page;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 1000;

/// List/filter entities with pagination support.
///
/// # Example
///
/// ```ignore
/// use kdt::{Project, ProjectListQuery, List};
///
/// // Fetch a single page
/// let page = Project::list_page(&client, &Default::default(), 0, 50).await?;
///
/// // Fetch all pages
/// let all = Project::list_all(&client, &ProjectListQuery::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// List entities matching the query (single page).
    ///
    /// # Arguments
    ///
    /// * `client` - The Kondukto API client
    /// * `query` - Query parameters for filtering
    /// * `start` - Offset of the first item
    /// * `limit` - Number of items per page
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &KonduktoClient,
        query: &Self::Query,
        start: u32,
        limit: u32,
    ) -> Result<Page<Self>>;

    /// List all entities matching the query (fetches all pages).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(client: &KonduktoClient, query: &Self::Query) -> Result<Vec<Self>> {
        let mut all_items = Vec::new();
        let mut start = 0;
        let mut pages = 0;

        loop {
            let result = Self::list_page(client, query, start, DEFAULT_PAGE_SIZE).await?;
            let has_more = result.has_more;
            start = result.next_start();
            all_items.extend(result.items);

            if !has_more {
                break;
            }

            pages += 1;
            if pages >= MAX_PAGES {
                tracing::warn!("Reached pagination limit of {} pages, stopping", MAX_PAGES);
                break;
            }
        }

        Ok(all_items)
    }
}
