//! GraphQL HTTP server.

use std::future::Future;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{debug, info};
use uuid::Uuid;

use kennel_core::models::Viewer;

use crate::context::{execute, ContextBuilder};
use crate::types::KennelSchema;

/// Header carrying the caller's request id; echoed on responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the viewer id.
pub const VIEWER_ID_HEADER: &str = "x-viewer-id";

/// Longest accepted header value for ids; longer values are ignored.
const MAX_ID_LENGTH: usize = 128;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_playground: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            enable_playground: true,
        }
    }
}

#[derive(Clone)]
struct AppState {
    schema: KennelSchema,
    contexts: ContextBuilder,
}

/// Build the application router.
pub fn router(schema: KennelSchema, contexts: ContextBuilder, config: &ServerConfig) -> Router {
    let graphql = if config.enable_playground {
        get(graphql_playground).post(graphql_handler)
    } else {
        axum::routing::post(graphql_handler)
    };

    let mut app = Router::new()
        .route("/graphql", graphql)
        .route("/health", get(health_check));

    if config.enable_playground {
        app = app.route("/", get(graphql_playground));
    }

    app.with_state(AppState { schema, contexts })
}

/// Start the GraphQL server.
pub async fn serve(
    schema: KennelSchema,
    contexts: ContextBuilder,
    config: ServerConfig,
) -> Result<(), std::io::Error> {
    serve_with_shutdown(schema, contexts, config, std::future::pending()).await
}

/// Start the GraphQL server with graceful shutdown support.
pub async fn serve_with_shutdown<F>(
    schema: KennelSchema,
    contexts: ContextBuilder,
    config: ServerConfig,
    shutdown_signal: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(schema, contexts, &config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("⚡ GraphQL server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    debug!("Server stopped");
    Ok(())
}

/// Read an id header, ignoring empty or oversized values.
fn header_id(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() || value.len() > MAX_ID_LENGTH {
        return None;
    }
    Some(value.to_owned())
}

/// GraphQL query handler.
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> Response {
    let request_id =
        header_id(&headers, REQUEST_ID_HEADER).unwrap_or_else(|| Uuid::new_v4().to_string());
    let viewer = Viewer {
        id: header_id(&headers, VIEWER_ID_HEADER),
    };

    let response = execute(
        &state.schema,
        &state.contexts,
        req.into_inner(),
        viewer,
        request_id.clone(),
        "http",
    )
    .await;

    let mut response = GraphQLResponse::from(response).into_response();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// GraphQL Playground UI.
async fn graphql_playground() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
