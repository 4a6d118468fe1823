//! Port trait for persisted favorite breeds.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Durable set of breeds the viewer marked as favorite.
///
/// Implementations own all persistence; the core never caches favorites
/// beyond a single call.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Whether a breed was saved as favorite.
    async fn contains(&self, breed_name: &str) -> StoreResult<bool>;

    /// Save a breed as favorite. Saving twice is not an error.
    async fn insert(&self, breed_name: &str) -> StoreResult<()>;

    /// All saved favorites, sorted by name.
    async fn list(&self) -> StoreResult<Vec<String>>;
}
