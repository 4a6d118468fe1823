//! Dog CEO HTTP client implementing the BreedSource port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};
use url::Url;

use kennel_core::error::{FetchError, FetchResult};
use kennel_core::metrics::{record_upstream_request, UpstreamTimer};
use kennel_core::ports::BreedSource;

/// Public Dog CEO API.
pub const DEFAULT_BASE_URL: &str = "https://dog.ceo/api";

/// Envelope status reported by successful calls.
const STATUS_SUCCESS: &str = "success";

/// Configuration for the Dog CEO client.
#[derive(Debug, Clone)]
pub struct DogApiConfig {
    /// API root (e.g., "https://dog.ceo/api").
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for DogApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Every Dog CEO response is wrapped as `{ "status": ..., "message": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: serde_json::Value,
}

/// Dog CEO adapter implementing the BreedSource port.
#[derive(Debug, Clone)]
pub struct DogApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DogApiClient {
    /// Build a client for the given API root.
    #[instrument(skip_all, fields(url = %config.base_url))]
    pub fn new(config: DogApiConfig) -> FetchResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            FetchError::Transport(format!("Invalid base URL {}: {}", config.base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(FetchError::Transport(format!(
                "Invalid base URL {}: cannot hold a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("kennel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        debug!("Client ready");

        Ok(Self { http, base_url })
    }

    /// Append path segments to the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport(format!("Cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Perform a GET and unwrap the envelope.
    ///
    /// Returns `Ok(None)` when the upstream says the resource does not
    /// exist (HTTP 404, or a non-success envelope status).
    async fn get(&self, endpoint: &'static str, url: Url) -> FetchResult<Option<serde_json::Value>> {
        let _timer = UpstreamTimer::new(endpoint);

        let response = match self.http.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "Upstream request failed");
                record_upstream_request(endpoint, "error");
                return Err(FetchError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        debug!(status = status.as_u16(), url = %url, "Upstream response");

        if status == StatusCode::NOT_FOUND {
            record_upstream_request(endpoint, "not_found");
            return Ok(None);
        }

        if !status.is_success() {
            error!(status = status.as_u16(), url = %url, "Upstream returned an error status");
            record_upstream_request(endpoint, "error");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to read upstream body");
            record_upstream_request(endpoint, "error");
            FetchError::Transport(e.to_string())
        })?;

        let envelope: Envelope = serde_json::from_slice(&body).map_err(|e| {
            error!(url = %url, error = %e, "Failed to decode upstream body");
            record_upstream_request(endpoint, "error");
            FetchError::Decode(e.to_string())
        })?;

        if envelope.status != STATUS_SUCCESS {
            warn!(url = %url, status = %envelope.status, "Upstream reported failure");
            record_upstream_request(endpoint, "not_found");
            return Ok(None);
        }

        record_upstream_request(endpoint, "success");
        Ok(Some(envelope.message))
    }
}

/// Decode an envelope message as a list of strings.
fn decode_strings(message: serde_json::Value) -> FetchResult<Vec<String>> {
    serde_json::from_value(message).map_err(|e| FetchError::Decode(e.to_string()))
}

#[async_trait]
impl BreedSource for DogApiClient {
    #[instrument(skip(self))]
    async fn list_breed_names(&self) -> FetchResult<Vec<String>> {
        let url = self.endpoint(&["breeds", "list"])?;
        let message = self
            .get("breeds_list", url.clone())
            .await?
            .ok_or_else(|| FetchError::Decode(format!("{} returned no breed list", url)))?;

        decode_strings(message)
    }

    #[instrument(skip(self))]
    async fn breed_images(&self, breed_name: &str) -> FetchResult<Option<Vec<String>>> {
        let url = self.endpoint(&["breed", breed_name, "images"])?;

        match self.get("breed_images", url).await? {
            Some(message) => decode_strings(message).map(Some),
            None => Ok(None),
        }
    }
}
