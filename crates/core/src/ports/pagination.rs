//! Pagination types for list queries.
//!
//! These types implement Relay-style cursor pagination, commonly used
//! with GraphQL but also applicable to other APIs. The algorithm that
//! windows a full edge list lives in [`crate::services::paginate`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Opaque cursor for pagination.
///
/// The cursor value is implementation-specific and should be treated
/// as an opaque token by clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub value: String,
}

impl Cursor {
    /// Wrap an already-encoded cursor value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Derive a cursor from a unique node attribute (base64 of the raw value).
    pub fn encode(raw: &str) -> Self {
        Self {
            value: STANDARD.encode(raw),
        }
    }

    /// Recover the raw attribute a cursor was derived from.
    ///
    /// Returns `None` for values that were not produced by [`Cursor::encode`].
    pub fn decode(&self) -> Option<String> {
        let bytes = STANDARD.decode(&self.value).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Pagination parameters for list queries.
///
/// Supports forward pagination (`first`/`after`) and backward
/// pagination (`last`/`before`). `first` and `last` are mutually
/// exclusive; counts are signed so that negative input can be rejected
/// rather than silently wrapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Number of items to fetch (forward pagination).
    pub first: Option<i32>,
    /// Cursor to start after (forward pagination).
    pub after: Option<Cursor>,
    /// Number of items to fetch (backward pagination).
    pub last: Option<i32>,
    /// Cursor to end before (backward pagination).
    pub before: Option<Cursor>,
}

/// Paginated result set with edges and page info.
///
/// This is the Relay connection pattern for cursor-based pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<T> {
    /// List of edges (node + cursor pairs).
    pub edges: Vec<Edge<T>>,
    /// Information about the current page.
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Cursor of the first returned edge.
    pub fn start_cursor(&self) -> Option<&Cursor> {
        self.edges.first().map(|e| &e.cursor)
    }

    /// Cursor of the last returned edge.
    pub fn end_cursor(&self) -> Option<&Cursor> {
        self.edges.last().map(|e| &e.cursor)
    }
}

/// A single item in a paginated result.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<T> {
    /// The actual item.
    pub node: T,
    /// Cursor for this item (used for pagination).
    pub cursor: Cursor,
}

impl<T> Edge<T> {
    pub fn new(cursor: Cursor, node: T) -> Self {
        Self { node, cursor }
    }
}

/// Information about the current page in a paginated result.
///
/// Derived from cursor trimming only; `first`/`last` slicing never
/// changes these flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
}
