//! Health probe for the configured completion endpoint.
//!
//! Exposes a lightweight reachability check:
//! `GET {endpoint}/openai/models` with bearer auth (best-effort model
//! listing). The returned [`HealthStatus`] is JSON-serializable and suitable
//! for a `/health` endpoint. [`HealthService::check`] is resilient and never
//! fails; every error is mapped to `ok = false` with a message.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error_handler::{ChatGatewayError, make_snippet};
use crate::services::azure_open_ai_service::{API_VERSION, AzureOpenAiService};

/// A serializable health snapshot of the gateway's upstream.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Whether an endpoint was configured at all.
    pub configured: bool,
    /// Target endpoint base URL, if configured.
    pub endpoint: Option<String>,
    /// Deployment the gateway is bound to, if configured.
    pub deployment: Option<String>,
    /// Overall health flag.
    pub ok: bool,
    /// Measured probe latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    /// Snapshot for a gateway without a configured endpoint. No I/O.
    pub fn not_configured() -> Self {
        Self {
            configured: false,
            endpoint: None,
            deployment: None,
            ok: false,
            latency_ms: 0,
            message: "endpoint is not configured".to_string(),
        }
    }

    fn probed(svc: &AzureOpenAiService, ok: bool, latency_ms: u128, message: String) -> Self {
        Self {
            configured: true,
            endpoint: Some(svc.endpoint().to_string()),
            deployment: Some(svc.deployment().to_string()),
            ok,
            latency_ms,
            message,
        }
    }
}

/// Reachability checker that reuses a single HTTP client.
///
/// The client carries a short default timeout independent from the
/// completion client; a health probe should answer quickly or not at all.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`ChatGatewayError::HttpTransport`] if the HTTP client cannot
    /// be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, ChatGatewayError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Probes the service's endpoint. Never returns an error: any failure is
    /// converted to `HealthStatus { ok: false, message: ... }`.
    pub async fn check(&self, svc: &AzureOpenAiService) -> HealthStatus {
        let start = Instant::now();
        match self.try_probe(svc).await {
            Ok(status) => {
                info!(
                    endpoint = %svc.endpoint(),
                    deployment = %svc.deployment(),
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status = HealthStatus::probed(
                    svc,
                    false,
                    start.elapsed().as_millis(),
                    err.to_string(),
                );
                warn!(
                    endpoint = %svc.endpoint(),
                    deployment = %svc.deployment(),
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict probe. Returns an error on hard failures.
    async fn try_probe(&self, svc: &AzureOpenAiService) -> Result<HealthStatus, ChatGatewayError> {
        let url = format!("{}/openai/models", svc.endpoint());
        let token = svc.credential().access_token().await?;

        let start = Instant::now();
        debug!(endpoint = %svc.endpoint(), "GET {}", url);

        let resp = self
            .client
            .get(&url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&token)
            .send()
            .await?;

        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Ok(HealthStatus::probed(
                svc,
                false,
                latency,
                format!("HTTP {status} from {url}: {}", make_snippet(&text)),
            ));
        }

        // Best-effort decode; a reachable endpoint with an unexpected body
        // still counts as healthy.
        #[derive(serde::Deserialize)]
        struct Models {
            data: Vec<serde_json::Value>,
        }

        match resp.json::<Models>().await {
            Ok(models) => Ok(HealthStatus::probed(
                svc,
                true,
                latency,
                format!("endpoint is reachable; {} models listed", models.data.len()),
            )),
            Err(e) => Ok(HealthStatus::probed(
                svc,
                true,
                latency,
                format!("endpoint is reachable; failed to decode model list: {e}"),
            )),
        }
    }
}
