//! Keyed batch loading with request-scoped memoization.
//!
//! A [`BatchCache`] sits in front of a [`BatchFn`] and guarantees at most
//! one fetch per distinct key for the lifetime of the cache. Keys identify
//! themselves through [`CacheKey`]; multi-field keys go through
//! [`StructuredKey`] so their identity is independent of field order.

mod cache;
mod key;

pub use cache::{BatchCache, DEFAULT_MAX_BATCH_SIZE};
pub use key::{CacheKey, KeyValue, StructuredKey};

use async_trait::async_trait;

use crate::error::FetchResult;

/// Injected fetch function behind a [`BatchCache`].
///
/// Implementations receive every key dispatched together and must return
/// exactly one outcome per key, in key order. A data-level "not found"
/// should be modelled in `Value` (e.g. `Option<T>`), not as an error.
#[async_trait]
pub trait BatchFn: Send + Sync + 'static {
    type Key: CacheKey + Clone + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;

    /// Fetch a batch of keys.
    async fn load(&self, keys: &[Self::Key]) -> Vec<FetchResult<Self::Value>>;
}
