//! Update trait for modifying entities.

use async_trait::async_trait;

use crate::client::KonduktoClient;
use crate::error::Result;

/// Update an existing entity.
///
/// # Example
///
/// ```ignore
/// use kdt::{Project, ProjectUpdateParams, Update};
///
/// let updated = Project::update(
///     &client,
///     "6512ab".to_string(),
///     ProjectUpdateParams {
///         default_branch: Some("develop".to_string()),
///         ..Default::default()
///     },
/// ).await?;
/// ```
#[async_trait]
pub trait Update: Sized {
    /// The ID type for this entity.
    type Id;

    /// Parameters for the update.
    type Params;

    /// Update the entity and return the updated version.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn update(client: &KonduktoClient, id: Self::Id, params: Self::Params) -> Result<Self>;
}
