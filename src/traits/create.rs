//! Create trait for adding new entities.

use async_trait::async_trait;

use crate::client::KonduktoClient;
use crate::error::Result;

/// Create a new entity.
///
/// The server echoes the created entity back, including the identifier it
/// assigned.
#[async_trait]
pub trait Create: Sized {
    /// Parameters for the creation request.
    type Params: Send + Sync;

    /// Create the entity and return it as stored by the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the request.
    async fn create(client: &KonduktoClient, params: &Self::Params) -> Result<Self>;
}
