//! Per-request breed loaders.
//!
//! [`BreedLoaders`] is built once per incoming request and dropped with
//! it. Raw upstream data is memoized in three [`BatchCache`]s; mapping to
//! [`Breed`] models happens at read time against the favorites store, so
//! a favorite saved earlier in a request is visible to later reads.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::{BreedError, BreedResult, FetchResult};
use crate::loader::{BatchCache, BatchFn};
use crate::models::{Breed, BreedFilter, Image, PhotosKey};
use crate::ports::{BreedSource, FavoritesStore};

// =============================================================================
// Batch functions
// =============================================================================

/// Full list of breed names (unit key: there is only one list).
struct BreedNames {
    source: Arc<dyn BreedSource>,
}

#[async_trait]
impl BatchFn for BreedNames {
    type Key = ();
    type Value = Arc<Vec<String>>;

    async fn load(&self, keys: &[()]) -> Vec<FetchResult<Self::Value>> {
        let outcome = self.source.list_breed_names().await.map(Arc::new);
        keys.iter().map(|_| outcome.clone()).collect()
    }
}

/// Raw image URLs keyed by breed name; `None` for unknown breeds.
struct BreedImages {
    source: Arc<dyn BreedSource>,
}

#[async_trait]
impl BatchFn for BreedImages {
    type Key = String;
    type Value = Option<Arc<Vec<String>>>;

    async fn load(&self, keys: &[String]) -> Vec<FetchResult<Self::Value>> {
        let fetches = keys.iter().map(|name| async move {
            let images = self.source.breed_images(name).await;
            images.map(|urls| urls.map(Arc::new))
        });
        join_all(fetches).await
    }
}

/// Photos derived from the images cache, so each breed's images are
/// fetched once per scope whatever limits are requested.
struct BreedPhotos {
    images: BatchCache<BreedImages>,
}

#[async_trait]
impl BatchFn for BreedPhotos {
    type Key = PhotosKey;
    type Value = Option<Arc<Vec<Image>>>;

    async fn load(&self, keys: &[PhotosKey]) -> Vec<FetchResult<Self::Value>> {
        let names = keys.iter().map(|k| k.breed_name.clone());
        let images = self.images.load_many(names).await;

        keys.iter()
            .zip(images)
            .map(|(key, urls)| {
                urls.map(|urls| {
                    urls.map(|urls| {
                        let limit = key.limit.unwrap_or(urls.len());
                        let photos: Vec<Image> = urls
                            .iter()
                            .take(limit)
                            .map(|url| Image::of_breed(&key.breed_name, url.as_str()))
                            .collect();
                        Arc::new(photos)
                    })
                })
            })
            .collect()
    }
}

// =============================================================================
// BreedLoaders
// =============================================================================

/// Request-scoped access to breed data.
///
/// Cloning yields a handle to the same scope. Never share an instance
/// across requests.
#[derive(Clone)]
pub struct BreedLoaders {
    favorites: Arc<dyn FavoritesStore>,
    names: BatchCache<BreedNames>,
    images: BatchCache<BreedImages>,
    photos: BatchCache<BreedPhotos>,
}

impl BreedLoaders {
    /// Open a new request scope over the given collaborators.
    pub fn new(source: Arc<dyn BreedSource>, favorites: Arc<dyn FavoritesStore>) -> Self {
        let images = BatchCache::new(BreedImages {
            source: Arc::clone(&source),
        });

        Self {
            favorites,
            names: BatchCache::new(BreedNames { source }),
            photos: BatchCache::new(BreedPhotos {
                images: images.clone(),
            }),
            images,
        }
    }

    /// List breeds matching `filter`, in upstream order.
    pub async fn list(&self, filter: BreedFilter) -> BreedResult<Vec<Breed>> {
        let names = self.names.load(()).await?;
        let saved: HashSet<String> = self.favorites.list().await?.into_iter().collect();

        Ok(names
            .iter()
            .map(|name| Breed::from_name(name, saved.contains(name)))
            .filter(|breed| filter.matches(breed))
            .collect())
    }

    /// Load a single breed by name; `None` if it does not exist.
    pub async fn load(&self, breed_name: &str) -> BreedResult<Option<Breed>> {
        if self.images.load(breed_name.to_owned()).await?.is_none() {
            return Ok(None);
        }

        let saved = self.favorites.contains(breed_name).await?;
        Ok(Some(Breed::from_name(breed_name, saved)))
    }

    /// Load several breeds; results are positional with `breed_names`.
    pub async fn load_many(&self, breed_names: &[String]) -> Vec<BreedResult<Option<Breed>>> {
        join_all(breed_names.iter().map(|name| self.load(name))).await
    }

    /// Load a breed's photos; `None` if the breed does not exist.
    pub async fn load_photos(&self, key: PhotosKey) -> BreedResult<Option<Vec<Image>>> {
        let photos = self.photos.load(key).await?;
        Ok(photos.map(|p| p.as_ref().clone()))
    }

    /// Save a breed as favorite and return its name.
    ///
    /// # Errors
    ///
    /// [`BreedError::NotFound`] if the breed does not exist upstream.
    pub async fn make_favorite(&self, breed_name: &str) -> BreedResult<String> {
        if self.images.load(breed_name.to_owned()).await?.is_none() {
            return Err(BreedError::NotFound(breed_name.to_owned()));
        }

        self.favorites.insert(breed_name).await?;
        Ok(breed_name.to_owned())
    }
}
