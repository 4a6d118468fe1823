//! Port trait for the upstream breed data source.
//!
//! This is the fetch collaborator behind the breed loaders. The core does
//! not know whether an implementation performs network I/O; adapters live
//! in the infrastructure layer (e.g., `kennel-dogapi`).

use async_trait::async_trait;

use crate::error::FetchResult;

/// Raw breed data provider.
#[async_trait]
pub trait BreedSource: Send + Sync {
    /// List every known breed name, in upstream order.
    async fn list_breed_names(&self) -> FetchResult<Vec<String>>;

    /// List image URLs for a breed.
    ///
    /// Returns `Ok(None)` if the breed does not exist. That is a valid
    /// result, distinct from a failed fetch.
    async fn breed_images(&self, breed_name: &str) -> FetchResult<Option<Vec<String>>>;
}
