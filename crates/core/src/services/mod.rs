//! Core services: pagination and per-request breed loading.

mod breeds;
mod pagination;

pub use breeds::BreedLoaders;
pub use pagination::{paginate, validate_pagination};
