//! Error types for the Kennel domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`PaginationError`] - Malformed connection arguments
//! - [`FetchError`] - Failures from the upstream breed source
//! - [`StoreError`] - Favorites store failures
//! - [`BreedError`] - Top-level errors returned by the breed loaders
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

/// Stable error code for a breed that does not exist upstream.
pub const ERR_BREED_NOT_FOUND: &str = "ERR_BREED_NOT_FOUND";

/// Stable error code for rejected pagination arguments.
pub const ERR_INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";

// =============================================================================
// Pagination Errors
// =============================================================================

/// Connection arguments that cannot be paginated.
///
/// Raised synchronously and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// `first`/`last` combination or value was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl PaginationError {
    /// Stable code for clients to match on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => ERR_INVALID_ARGUMENT,
        }
    }
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Failures raised while fetching raw data from the breed source.
///
/// `Clone` is required: a failed load is cached for the rest of the
/// request scope and replayed to every caller awaiting the same key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The upstream answered with an unexpected HTTP status.
    #[error("Upstream request to {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Upstream decoding error: {0}")]
    Decode(String),

    /// A batch function broke its contract of one outcome per key.
    #[error("Batch function returned {actual} results for {expected} keys")]
    BatchMismatch {
        /// Number of keys handed to the batch function.
        expected: usize,
        /// Number of outcomes it returned.
        actual: usize,
    },

    /// The batch dispatch task went away before resolving the key.
    #[error("Batch dispatch was dropped before completing")]
    Dropped,
}

// =============================================================================
// Store Errors
// =============================================================================

/// Favorites store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A value was rejected by the store.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

// =============================================================================
// Breed Errors
// =============================================================================

/// Errors returned by [`crate::services::BreedLoaders`].
#[derive(Debug, Error)]
pub enum BreedError {
    /// The breed does not exist upstream.
    #[error("Breed not found: {0}")]
    NotFound(String),

    /// Upstream fetch failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Favorites store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BreedError {
    /// Stable code for errors that are meant to reach end users.
    ///
    /// Errors without a code are infrastructure failures and should be
    /// surfaced as plain API errors.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::NotFound(_) => Some(ERR_BREED_NOT_FOUND),
            Self::Fetch(_) | Self::Store(_) => None,
        }
    }

    /// Message exposed to API clients alongside [`BreedError::code`].
    ///
    /// Unlike `Display`, it never echoes caller input.
    pub fn public_message(&self) -> Option<&'static str> {
        match self {
            Self::NotFound(_) => Some("Breed not found"),
            Self::Fetch(_) | Self::Store(_) => None,
        }
    }

    /// Human-friendly message paired with [`BreedError::code`].
    pub fn friendly_message(&self) -> Option<&'static str> {
        match self {
            Self::NotFound(_) => {
                Some("I couldn't find that breed. Please check your ID and try again")
            }
            Self::Fetch(_) | Self::Store(_) => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for pagination.
pub type PaginationResult<T> = Result<T, PaginationError>;

/// Result type for upstream fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for favorites store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for breed loader operations.
pub type BreedResult<T> = Result<T, BreedError>;
