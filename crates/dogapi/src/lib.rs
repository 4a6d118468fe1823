//! Dog CEO API adapter for Kennel.
//!
//! This crate implements the [`BreedSource`] port from `kennel-core`,
//! fetching breed names and breed images over HTTPS.
//!
//! # Features
//!
//! - Breed listing (`GET /breeds/list`)
//! - Breed images (`GET /breed/{name}/images`), with unknown breeds
//!   reported as `Ok(None)` rather than an error
//! - Per-request timeout, request logging and upstream metrics
//!
//! # Usage
//!
//! ```ignore
//! use kennel_dogapi::{DogApiClient, DogApiConfig};
//!
//! let client = DogApiClient::new(DogApiConfig::default())?;
//! let names = client.list_breed_names().await?;
//! let images = client.breed_images("husky").await?;
//! ```
//!
//! [`BreedSource`]: kennel_core::ports::BreedSource

mod client;

pub use client::{DogApiClient, DogApiConfig, DEFAULT_BASE_URL};
