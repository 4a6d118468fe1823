//! Direct invocation transport.
//!
//! Executes a GraphQL operation described by a single JSON event, for
//! callers that invoke the service as a function rather than over HTTP:
//!
//! ```json
//! {
//!   "query": "query GetBreeds { breeds { edges { node { id } } } }",
//!   "variables": {},
//!   "operationName": "GetBreeds",
//!   "context": { "viewer": {}, "requestId": "" }
//! }
//! ```

use async_graphql::{Request, Response, Variables};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use kennel_core::models::Viewer;

use crate::context::{execute, ContextBuilder};
use crate::types::KennelSchema;

/// A GraphQL operation delivered as an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub query: String,
    #[serde(default)]
    pub variables: Option<serde_json::Value>,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub context: InvocationContext,
}

/// Caller context of an [`Invocation`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    #[serde(default)]
    pub viewer: Viewer,
    /// Generated when absent or empty.
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Invocation errors. GraphQL errors are not among them: they are part
/// of a successful response.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Invalid invocation event: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type InvocationResult<T> = Result<T, InvocationError>;

/// Execute an invocation against `schema` in a fresh request scope.
pub async fn invoke(
    schema: &KennelSchema,
    contexts: &ContextBuilder,
    invocation: Invocation,
) -> Response {
    let Invocation {
        query,
        variables,
        operation_name,
        context,
    } = invocation;

    let mut request = Request::new(query);
    if let Some(variables) = variables {
        request = request.variables(Variables::from_json(variables));
    }
    if let Some(operation_name) = operation_name {
        request = request.operation_name(operation_name);
    }

    let request_id = context
        .request_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    execute(schema, contexts, request, context.viewer, request_id, "invocation").await
}

/// Decode a JSON event, execute it and encode the GraphQL response.
pub async fn invoke_json(
    schema: &KennelSchema,
    contexts: &ContextBuilder,
    event: &str,
) -> InvocationResult<serde_json::Value> {
    let invocation: Invocation = serde_json::from_str(event).map_err(InvocationError::Decode)?;
    let response = invoke(schema, contexts, invocation).await;
    serde_json::to_value(&response).map_err(InvocationError::Encode)
}
