//! Core domain layer for Kennel.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! the request-scoped services behind the Kennel dog-breed GraphQL API.
//! It follows hexagonal architecture principles - this is the innermost
//! layer with no dependencies on infrastructure, and it never logs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      kennel (binary)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │         kennel-graphql          │        kennel-dogapi      │
//! │    (schema, HTTP, invocation)   │      (upstream HTTP)      │
//! ├─────────────────────────────────┴───────────────────────────┤
//! │                      kennel-storage                         │
//! │                   (favorites store)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     kennel-core  ← YOU ARE HERE             │
//! │          (models, ports, loader, pagination, services)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (Breed, Image, lookup keys)
//! - [`ports`] - Interface traits for adapters to implement, and
//!   Relay connection types
//! - [`loader`] - Request-scoped keyed batch cache
//! - [`services`] - Pagination engine and per-request breed loaders
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Ports
//!
//! - [`ports::BreedSource`] - Fetch raw breed data from upstream
//! - [`ports::FavoritesStore`] - Persist favorite breeds
//!
//! ## Request scope
//!
//! Every incoming request builds its own [`services::BreedLoaders`].
//! Within that scope each distinct key is fetched at most once, failures
//! included; nothing is shared across requests.
//!
//! ## Pagination
//!
//! [`services::paginate`] windows a complete edge list with Relay
//! `first`/`last`/`before`/`after` semantics.

pub mod error;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
