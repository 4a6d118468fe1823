//! GraphQL API for Kennel.
//!
//! Exposes breeds, their photos and the viewer's favorites. The same
//! schema is served over HTTP ([`serve_with_shutdown`]) and through
//! direct invocation ([`invoke_json`]); both run every operation in a
//! fresh [`RequestContext`]:
//!
//! ```ignore
//! use kennel_graphql::{build_schema, serve_with_shutdown, ContextBuilder, ServerConfig};
//!
//! let contexts = ContextBuilder::new(source, favorites);
//! serve_with_shutdown(build_schema(), contexts, ServerConfig::default(), shutdown).await?;
//! ```

mod context;
mod errors;
mod invocation;
mod relay;
mod schema;
mod server;
mod types;

pub use context::{execute, ContextBuilder, RequestContext};
pub use invocation::{
    invoke, invoke_json, Invocation, InvocationContext, InvocationError, InvocationResult,
};
pub use relay::{to_global_id, GlobalId};
pub use schema::{build_schema, MutationRoot, QueryRoot, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH};
pub use server::{
    router, serve, serve_with_shutdown, ServerConfig, REQUEST_ID_HEADER, VIEWER_ID_HEADER,
};
pub use types::KennelSchema;
