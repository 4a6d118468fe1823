//! Kennel - GraphQL API over the Dog CEO breed catalogue.
//!
//! # Usage
//!
//! ```bash
//! # Start the HTTP server with default config
//! kennel
//!
//! # Point at another Dog CEO deployment
//! DOG_API_URL=http://localhost:8080/api GRAPHQL_PORT=5000 kennel
//!
//! # Execute a single invocation event and print the response
//! echo '{"query": "{ breeds { breeds { name } } }"}' | kennel --invoke -
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use kennel_core::metrics::init_metrics;
use kennel_dogapi::{DogApiClient, DogApiConfig, DEFAULT_BASE_URL};
use kennel_graphql::{
    build_schema, invoke_json, serve_with_shutdown, ContextBuilder, KennelSchema, ServerConfig,
};
use kennel_storage::InMemoryFavorites;

/// Kennel CLI.
#[derive(Parser, Debug)]
#[command(name = "kennel")]
#[command(about = "Kennel - GraphQL API over the Dog CEO breed catalogue")]
#[command(version)]
struct Cli {
    /// Dog CEO API root.
    #[arg(long, env = "DOG_API_URL", default_value = DEFAULT_BASE_URL)]
    dog_api_url: String,

    /// Address the GraphQL server binds to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// GraphQL server port.
    #[arg(long, env = "GRAPHQL_PORT", default_value = "4000")]
    port: u16,

    /// Prometheus metrics port.
    #[arg(long, env = "METRICS_PORT", default_value = "9090")]
    metrics_port: u16,

    /// Timeout for each upstream request, in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Do not serve GraphiQL on `GET /` and `GET /graphql`.
    #[arg(long)]
    no_playground: bool,

    /// Execute one invocation event from a file (or `-` for stdin),
    /// print the GraphQL response and exit.
    #[arg(long, value_name = "PATH")]
    invoke: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    // stdout carries the response in invocation mode
    init_tracing(&cli.log_level, cli.json_logs, cli.invoke.is_some());

    let source = DogApiClient::new(DogApiConfig {
        base_url: cli.dog_api_url.clone(),
        timeout: Duration::from_secs(cli.request_timeout_secs),
    })
    .context("Failed to configure Dog API client")?;

    let contexts = ContextBuilder::new(Arc::new(source), Arc::new(InMemoryFavorites::new()));
    let schema = build_schema();

    if let Some(path) = cli.invoke.as_deref() {
        return run_invocation(&schema, &contexts, path).await;
    }

    // Prometheus metrics exporter (optional - failures don't crash the app)
    let metrics_enabled = match format!("{}:{}", cli.host, cli.metrics_port).parse::<std::net::SocketAddr>() {
        Ok(metrics_addr) => {
            match PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
            {
                Ok(()) => {
                    init_metrics();
                    true
                }
                Err(e) => {
                    warn!("⚠️  Failed to start metrics exporter: {}. Continuing without metrics.", e);
                    false
                }
            }
        }
        Err(e) => {
            warn!("⚠️  Invalid metrics address: {}. Continuing without metrics.", e);
            false
        }
    };

    // ─────────────────────────────────────────────────────────────────────────
    // 🚀 STARTUP
    // ─────────────────────────────────────────────────────────────────────────
    info!("🚀 Starting Kennel");
    debug!(dog_api_url = %mask_password(&cli.dog_api_url), "Breed source");

    let config = ServerConfig {
        host: cli.host.clone(),
        port: cli.port,
        enable_playground: !cli.no_playground,
    };

    // ─────────────────────────────────────────────────────────────────────────
    // ✅ READY
    // ─────────────────────────────────────────────────────────────────────────
    info!("✅ Kennel ready");
    info!("   ⚡ GraphQL:  http://localhost:{}/graphql", cli.port);
    if metrics_enabled {
        info!(
            "   📊 Metrics:  http://localhost:{}/metrics",
            cli.metrics_port
        );
    } else {
        info!("   📊 Metrics:  disabled");
    }
    info!("   Press Ctrl+C to stop");

    serve_with_shutdown(schema, contexts, config, shutdown_signal())
        .await
        .context("GraphQL server failed")?;

    info!("🛑 Shutdown complete");
    Ok(())
}

/// Execute a single invocation event and print the response as JSON.
async fn run_invocation(schema: &KennelSchema, contexts: &ContextBuilder, path: &Path) -> Result<()> {
    let event = if path == Path::new("-") {
        read_event(tokio::io::stdin())
            .await
            .context("Failed to read invocation event from stdin")?
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read invocation event from {}", path.display()))?
    };

    let response = invoke_json(schema, contexts, &event)
        .await
        .context("Invocation failed")?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Read a whole invocation event from `reader`.
async fn read_event<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut event = String::new();
    reader.read_to_string(&mut event).await?;
    Ok(event)
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool, to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match (json, to_stderr) {
        (true, false) => fmt().with_env_filter(filter).json().init(),
        (true, true) => fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(std::io::stderr)
            .init(),
        (false, to_stderr) => {
            let builder = fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            if to_stderr {
                builder.with_writer(std::io::stderr).init();
            } else {
                builder.init();
            }
        }
    }
}

/// Mask password in a URL for logging.
fn mask_password(url_str: &str) -> String {
    match url::Url::parse(url_str) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutting down...");
}
