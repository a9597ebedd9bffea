//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::KonduktoClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```ignore
/// use kdt::{KonduktoClient, Scan, Get};
///
/// let scan = Scan::get(&client, "65a1f0c2e4b0".to_string()).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(client: &KonduktoClient, id: Self::Id) -> Result<Self>;
}
