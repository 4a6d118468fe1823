//! In-memory cursor pagination.
//!
//! Windows a complete, ordered edge list following the Relay connection
//! algorithm: cursors trim first (`after`, then `before`), then counts
//! slice (`first`, then `last`). Page flags come from cursor trimming only.
//!
//! Cursors that do not match any edge are ignored, so a cursor pointing at
//! an item that has since disappeared from the underlying set still pages.

use crate::error::{PaginationError, PaginationResult};
use crate::ports::{Connection, Cursor, Edge, PageInfo, Pagination};

/// Paginate a full edge list.
///
/// # Errors
///
/// [`PaginationError::InvalidArgument`] when both `first` and `last` are
/// present, or when either is negative.
pub fn paginate<T>(all_edges: Vec<Edge<T>>, pagination: &Pagination) -> PaginationResult<Connection<T>> {
    validate_pagination(pagination)?;

    let (mut edges, page_info) = apply_cursors_to_edges(
        all_edges,
        pagination.before.as_ref(),
        pagination.after.as_ref(),
    );

    if let Some(first) = pagination.first.and_then(|n| usize::try_from(n).ok()) {
        edges.truncate(first);
    }

    if let Some(last) = pagination.last.and_then(|n| usize::try_from(n).ok()) {
        if edges.len() > last {
            edges.drain(..edges.len() - last);
        }
    }

    Ok(Connection { edges, page_info })
}

/// Reject argument combinations the engine refuses to page.
///
/// Relay allows `first` and `last` together but discourages it; paging
/// both directions at once is refused here.
pub fn validate_pagination(pagination: &Pagination) -> PaginationResult<()> {
    if pagination.first.is_some() && pagination.last.is_some() {
        return Err(PaginationError::InvalidArgument(
            "Cannot page both forward and backward".into(),
        ));
    }

    if pagination.first.is_some_and(|n| n < 0) {
        return Err(PaginationError::InvalidArgument(
            "first must be greater than or equal to 0".into(),
        ));
    }

    if pagination.last.is_some_and(|n| n < 0) {
        return Err(PaginationError::InvalidArgument(
            "last must be greater than or equal to 0".into(),
        ));
    }

    Ok(())
}

/// Drop everything up to and including `after`, and everything from
/// `before` onwards.
///
/// In SQL terms with ordered keys this is `key > after AND key < before`.
fn apply_cursors_to_edges<T>(
    mut edges: Vec<Edge<T>>,
    before: Option<&Cursor>,
    after: Option<&Cursor>,
) -> (Vec<Edge<T>>, PageInfo) {
    let mut page_info = PageInfo::default();

    if let Some(after) = after {
        if let Some(index) = edges.iter().position(|e| &e.cursor == after) {
            edges.drain(..=index);
            page_info.has_previous_page = true;
        }
    }

    if let Some(before) = before {
        if let Some(index) = edges.iter().position(|e| &e.cursor == before) {
            edges.truncate(index);
            page_info.has_next_page = true;
        }
    }

    (edges, page_info)
}
