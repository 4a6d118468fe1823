//! In-memory favorites store.
//!
//! Favorites live for the lifetime of the process. The store is created
//! once by the binary and shared behind an `Arc`; unlike the loaders, it
//! is not request-scoped.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use kennel_core::error::{StoreError, StoreResult};
use kennel_core::ports::FavoritesStore;

/// Maximum accepted breed name length.
const MAX_BREED_NAME_LENGTH: usize = 128;

/// Process-local implementation of [`FavoritesStore`].
#[derive(Debug, Default)]
pub struct InMemoryFavorites {
    names: RwLock<BTreeSet<String>>,
}

impl InMemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `names`.
    pub fn with_favorites<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: RwLock::new(names.into_iter().map(Into::into).collect()),
        }
    }
}

/// Validate a breed name before it enters the store.
fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidValue("breed name cannot be empty".into()));
    }
    if name.len() > MAX_BREED_NAME_LENGTH {
        return Err(StoreError::InvalidValue(format!(
            "breed name too long: maximum {} characters allowed",
            MAX_BREED_NAME_LENGTH
        )));
    }
    Ok(())
}

#[async_trait]
impl FavoritesStore for InMemoryFavorites {
    async fn contains(&self, breed_name: &str) -> StoreResult<bool> {
        Ok(self.names.read().await.contains(breed_name))
    }

    async fn insert(&self, breed_name: &str) -> StoreResult<()> {
        validate_name(breed_name)?;
        self.names.write().await.insert(breed_name.to_owned());
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self.names.read().await.iter().cloned().collect())
    }
}
