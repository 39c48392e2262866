//! The chat gateway: accepts a plain-text customer message, forwards it to
//! the configured chat-completion deployment, and returns either the
//! generated reply or a user-safe error message.
//!
//! The gateway is deliberately forgiving at its boundary: a missing endpoint
//! puts it into a disabled state instead of failing construction, and every
//! runtime failure is logged in full but collapsed to one generic message
//! before it reaches the caller. [`ChatGateway::get_response`] therefore
//! never returns an error type; [`ChatResult`] carries the outcome.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{ChatConfig, chat_config_from_env};
use crate::credentials::TokenCredential;
use crate::error_handler::Result;
use crate::health_service::{HealthService, HealthStatus};
use crate::services::azure_open_ai_service::AzureOpenAiService;

/// System instruction prepended to every conversation.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant for Zava Storefront. \
     Help customers with product questions and shopping assistance.";

/// User-facing message returned while the gateway is disabled.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Chat service is not configured. Please set the AzureAI:Endpoint configuration.";

/// User-facing message returned for every runtime failure.
pub const GENERIC_ERROR_MESSAGE: &str =
    "An error occurred while processing your request. Please try again.";

/// Outcome of one chat request, as handed to the web layer.
///
/// Exactly one of `response`/`error` is populated, keyed by `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatResult {
    /// Whether a reply was generated.
    pub success: bool,
    /// The generated reply, present iff `success`.
    pub response: Option<String>,
    /// A user-safe error message, present iff `!success`.
    pub error: Option<String>,
}

impl ChatResult {
    /// A successful result carrying the generated reply.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(text.into()),
            error: None,
        }
    }

    /// A failed result carrying a user-safe message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(message.into()),
        }
    }
}

/// Fixed per-instance state, decided once at construction.
enum GatewayState {
    /// No endpoint configured; every call short-circuits.
    Disabled,
    /// Endpoint configured; calls go to the bound completion client.
    Ready(AzureOpenAiService),
}

/// Gateway between the web layer and the chat-completion provider.
///
/// Construct once at startup and share behind an `Arc`; all methods take
/// `&self` and concurrent callers are independent.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use chat_gateway::{ChatGateway, ChatConfig, ImdsManagedIdentityCredential};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cfg = ChatConfig {
///     endpoint: Some("https://myresource.openai.azure.com".into()),
///     ..Default::default()
/// };
/// let credential = Arc::new(ImdsManagedIdentityCredential::new()?);
/// let gateway = Arc::new(ChatGateway::new(cfg, credential)?);
///
/// let result = gateway.get_response("Do you stock USB-C cables?").await;
/// if result.success {
///     println!("{}", result.response.unwrap());
/// }
/// # Ok(()) }
/// ```
pub struct ChatGateway {
    state: GatewayState,
    health: HealthService,
}

impl ChatGateway {
    /// Builds a gateway from the given config and credential capability.
    ///
    /// With an endpoint present the completion client is bound to it; no
    /// network reachability is validated here. With the endpoint absent or
    /// blank the gateway enters its disabled state and a warning is logged
    /// once — misconfiguration is tolerated and surfaced on use.
    ///
    /// # Errors
    /// Returns [`crate::error_handler::ConfigError::InvalidFormat`] if a
    /// present endpoint has no HTTP scheme, or
    /// [`crate::error_handler::ChatGatewayError::HttpTransport`] if the HTTP
    /// client cannot be built.
    pub fn new(cfg: ChatConfig, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        let state = match cfg.endpoint() {
            Some(endpoint) => {
                let service = AzureOpenAiService::new(
                    endpoint,
                    cfg.deployment(),
                    cfg.timeout_secs,
                    credential,
                )?;
                GatewayState::Ready(service)
            }
            None => {
                warn!("AZUREAI_ENDPOINT is not configured; chat functionality will be limited");
                GatewayState::Disabled
            }
        };

        Ok(Self {
            state,
            health: HealthService::new(None)?,
        })
    }

    /// Builds a gateway from the `AZUREAI_*` environment variables.
    ///
    /// # Errors
    /// Propagates env parsing errors from
    /// [`chat_config_from_env`] plus everything [`ChatGateway::new`] returns.
    pub fn from_env(credential: Arc<dyn TokenCredential>) -> Result<Self> {
        Self::new(chat_config_from_env()?, credential)
    }

    /// Whether an endpoint was configured at construction.
    pub fn is_configured(&self) -> bool {
        matches!(self.state, GatewayState::Ready(_))
    }

    /// Forwards `user_message` to the completion deployment and returns the
    /// generated reply, or a user-safe error message.
    ///
    /// The message is sent verbatim as the user turn after the fixed
    /// [`SYSTEM_PROMPT`]; no sanitization and no local length limit. Failure
    /// detail (transport, auth, provider status, malformed payload) is
    /// logged for operators and never exposed to the caller.
    pub async fn get_response(&self, user_message: &str) -> ChatResult {
        let service = match &self.state {
            GatewayState::Disabled => return ChatResult::failure(NOT_CONFIGURED_MESSAGE),
            GatewayState::Ready(service) => service,
        };

        info!("processing chat request");

        match service.complete(SYSTEM_PROMPT, user_message).await {
            Ok(reply) => {
                info!("chat response generated successfully");
                ChatResult::reply(reply)
            }
            Err(err) => {
                error!(error = %err, "error processing chat request");
                ChatResult::failure(GENERIC_ERROR_MESSAGE)
            }
        }
    }

    /// Probes the configured endpoint and returns a serializable snapshot.
    ///
    /// Never fails: a disabled gateway reports `ok = false` without any
    /// network I/O, and probe errors are folded into the status message.
    pub async fn health(&self) -> HealthStatus {
        match &self.state {
            GatewayState::Disabled => HealthStatus::not_configured(),
            GatewayState::Ready(service) => self.health.check(service).await,
        }
    }
}
