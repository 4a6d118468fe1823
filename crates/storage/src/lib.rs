//! Storage layer for Kennel.
//!
//! This crate provides implementations of the [`FavoritesStore`] port
//! defined in `kennel-core`.
//!
//! # Architecture
//!
//! - [`memory::InMemoryFavorites`] - Process-local favorites set, owned by
//!   the binary and injected into every request scope
//!
//! # Usage
//!
//! ```ignore
//! use kennel_storage::InMemoryFavorites;
//!
//! let favorites: Arc<dyn FavoritesStore> = Arc::new(InMemoryFavorites::new());
//! let loaders = BreedLoaders::new(source, favorites.clone());
//! ```
//!
//! [`FavoritesStore`]: kennel_core::ports::FavoritesStore

pub mod memory;

pub use memory::InMemoryFavorites;
