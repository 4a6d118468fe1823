//! Domain models for the breed catalogue.
//!
//! These models are transport-agnostic and represent the canonical
//! form of breed data within the domain layer.

use serde::{Deserialize, Serialize};

use crate::loader::{CacheKey, StructuredKey};

// =============================================================================
// Breed classification
// =============================================================================

/// Breeds considered fluffy.
pub const FLUFFY_BREEDS: &[&str] = &[
    "husky", "malamute", "mastiff", "sheepdog", "poodle", "shiba", "samoyed",
];

/// Breeds that are always favorites, independent of the favorites store.
pub const BUILTIN_FAVORITES: &[&str] = &[
    "cotondetulear",
    "dalmation",
    "malamute",
    "pointer",
    "wolfhound",
];

// =============================================================================
// Breed
// =============================================================================

/// A dog breed.
///
/// The upstream source identifies breeds by name only, so `id == name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    pub id: String,
    pub name: String,
    pub fluffy: bool,
    pub favorite: bool,
}

impl Breed {
    /// Map a raw breed name to a model.
    ///
    /// `saved_favorite` is whether the favorites store holds this breed.
    pub fn from_name(name: &str, saved_favorite: bool) -> Self {
        Self {
            id: name.to_owned(),
            name: name.to_owned(),
            fluffy: FLUFFY_BREEDS.contains(&name),
            favorite: saved_favorite || BUILTIN_FAVORITES.contains(&name),
        }
    }
}

/// A photo of a breed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub title: String,
}

impl Image {
    pub fn of_breed(breed_name: &str, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: format!("Photo of {breed_name}"),
        }
    }
}

// =============================================================================
// Lookup keys and filters
// =============================================================================

/// Filter options for breed listings.
///
/// Unset fields do not filter; set fields must all match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreedFilter {
    pub fluffy: Option<bool>,
    pub favorite: Option<bool>,
}

impl BreedFilter {
    /// Only favorite breeds.
    pub fn favorites() -> Self {
        Self {
            favorite: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, breed: &Breed) -> bool {
        self.fluffy.map_or(true, |f| breed.fluffy == f)
            && self.favorite.map_or(true, |f| breed.favorite == f)
    }
}

/// Key for a breed's photos, optionally capped to `limit` images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotosKey {
    pub breed_name: String,
    pub limit: Option<usize>,
}

impl PhotosKey {
    pub fn new(breed_name: impl Into<String>) -> Self {
        Self {
            breed_name: breed_name.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn structured(&self) -> StructuredKey {
        StructuredKey::new()
            .field("breed_name", self.breed_name.as_str())
            .field("limit", self.limit)
    }
}

impl CacheKey for PhotosKey {
    type Id = String;

    fn cache_id(&self) -> Self::Id {
        self.structured().canonical()
    }
}

// =============================================================================
// Viewer
// =============================================================================

/// The caller on whose behalf a request runs.
///
/// Viewers are not authenticated; the id is only carried for
/// request-scoped log context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    #[serde(default)]
    pub id: Option<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }
}
