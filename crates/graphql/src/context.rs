//! Per-request execution context.

use std::sync::Arc;

use async_graphql::{Request, Response};
use tracing::{debug, info_span, warn, Instrument};

use kennel_core::metrics::record_graphql_request;
use kennel_core::models::Viewer;
use kennel_core::ports::{BreedSource, FavoritesStore};
use kennel_core::services::BreedLoaders;

use crate::types::KennelSchema;

/// Data attached to a single GraphQL operation.
///
/// Resolvers reach it through `ctx.data::<RequestContext>()`.
#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub viewer: Viewer,
    pub loaders: BreedLoaders,
}

/// Builds a fresh [`RequestContext`] for each incoming request.
///
/// The builder itself is shared process-wide; the loaders it hands out
/// are not.
#[derive(Clone)]
pub struct ContextBuilder {
    source: Arc<dyn BreedSource>,
    favorites: Arc<dyn FavoritesStore>,
}

impl ContextBuilder {
    pub fn new(source: Arc<dyn BreedSource>, favorites: Arc<dyn FavoritesStore>) -> Self {
        Self { source, favorites }
    }

    pub fn build(&self, viewer: Viewer, request_id: String) -> RequestContext {
        RequestContext {
            request_id,
            viewer,
            loaders: BreedLoaders::new(Arc::clone(&self.source), Arc::clone(&self.favorites)),
        }
    }
}

/// Execute one operation in its own scope, under a span carrying the
/// request id and viewer.
pub async fn execute(
    schema: &KennelSchema,
    contexts: &ContextBuilder,
    request: Request,
    viewer: Viewer,
    request_id: String,
    transport: &'static str,
) -> Response {
    let span = info_span!(
        "graphql_request",
        request_id = %request_id,
        viewer_id = viewer.id.as_deref().unwrap_or("anonymous"),
        transport
    );
    let scope = contexts.build(viewer, request_id);

    async move {
        let response = schema.execute(request.data(scope)).await;

        if response.errors.is_empty() {
            debug!("Operation completed");
        } else {
            warn!(errors = response.errors.len(), "Operation completed with errors");
        }
        record_graphql_request(transport, !response.errors.is_empty());

        response
    }
    .instrument(span)
    .await
}
