//! Azure OpenAI chat-completion client.
//!
//! Minimal, non-streaming client around the Azure OpenAI data-plane REST
//! API. The deployment selects the hosted model, so the chat URL is derived
//! from endpoint + deployment:
//! - POST {endpoint}/openai/deployments/{deployment}/chat/completions
//!
//! Authentication is a bearer token obtained from the injected
//! [`TokenCredential`] on every call; no static key is ever attached to the
//! client. Errors are normalized via the unified types in `error_handler`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::credentials::TokenCredential;
use crate::error_handler::{ChatGatewayError, ProviderError, make_snippet, validate_http_endpoint};

/// Data-plane API version sent with every request.
pub(crate) const API_VERSION: &str = "2024-10-21";

/// Thin client for one Azure OpenAI chat deployment.
///
/// Constructed once per gateway. Internally keeps a preconfigured
/// `reqwest::Client` (timeout and default headers) and the precomputed chat
/// URL. The only high-level operation is [`AzureOpenAiService::complete`].
pub struct AzureOpenAiService {
    client: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    deployment: String,
    endpoint: String,
    url_chat: String,
}

impl std::fmt::Debug for AzureOpenAiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiService")
            .field("deployment", &self.deployment)
            .field("endpoint", &self.endpoint)
            .field("url_chat", &self.url_chat)
            .finish_non_exhaustive()
    }
}

impl AzureOpenAiService {
    /// Creates a new client bound to `endpoint` and `deployment`.
    ///
    /// Validates the endpoint scheme and builds the HTTP client. No network
    /// I/O happens here; reachability is only discovered on use.
    ///
    /// # Errors
    /// - [`ChatGatewayError::Config`] if the endpoint has no HTTP scheme
    /// - [`ChatGatewayError::HttpTransport`] if the client cannot be built
    pub fn new(
        endpoint: &str,
        deployment: &str,
        timeout_secs: Option<u64>,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, ChatGatewayError> {
        validate_http_endpoint("AZUREAI_ENDPOINT", endpoint)?;

        let timeout = timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/');
        let url_chat = format!("{base}/openai/deployments/{deployment}/chat/completions");

        info!(
            deployment = %deployment,
            endpoint = %endpoint,
            timeout_secs = timeout.as_secs(),
            "AzureOpenAiService initialized"
        );

        Ok(Self {
            client,
            credential,
            deployment: deployment.to_string(),
            endpoint: base.to_string(),
            url_chat,
        })
    }

    /// The deployment this client is bound to.
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// The endpoint base URL this client is bound to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The credential capability this client authenticates with.
    pub(crate) fn credential(&self) -> &Arc<dyn TokenCredential> {
        &self.credential
    }

    /// Performs a **non-streaming** chat completion with exactly two turns:
    /// the `system` instruction followed by `user_message` verbatim.
    ///
    /// # Errors
    /// - [`ChatGatewayError::Credential`] if no bearer token is available
    /// - [`ChatGatewayError::Provider`] with `HttpStatus` for non-2xx
    /// - [`ChatGatewayError::HttpTransport`] for client/network failures
    /// - [`ChatGatewayError::Provider`] with `Decode` for bad JSON
    /// - [`ChatGatewayError::Provider`] with `EmptyChoices` if no choice
    ///   carries content
    pub async fn complete(
        &self,
        system: &str,
        user_message: &str,
    ) -> Result<String, ChatGatewayError> {
        let started = Instant::now();
        let token = self.credential.access_token().await?;
        let body = ChatCompletionRequest::two_turns(system, user_message);

        debug!(
            deployment = %self.deployment,
            endpoint = %self.endpoint,
            message_len = user_message.len(),
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                deployment = %self.deployment,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned non-success status"
            );

            return Err(ProviderError::HttpStatus {
                status,
                url,
                snippet,
            }
            .into());
        }

        let out: ChatCompletionResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    deployment = %self.deployment,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode chat completion response"
                );
                return Err(ProviderError::Decode(format!(
                    "serde error: {e}; expected `choices[0].message.content`"
                ))
                .into());
            }
        };

        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or(ProviderError::EmptyChoices)?;

        info!(
            deployment = %self.deployment,
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(content)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for the chat-completions route. The deployment is addressed
/// in the URL path, so the body carries only the conversation.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Builds the fixed two-turn conversation: system then user.
    fn two_turns(system: &'a str, user: &'a str) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Minimal completion response. Fields beyond the first usable choice are
/// ignored.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_is_exactly_two_turns_in_order() {
        let body = ChatCompletionRequest::two_turns("be helpful", "hi there");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [
                    { "role": "system", "content": "be helpful" },
                    { "role": "user", "content": "hi there" },
                ]
            })
        );
    }

    #[test]
    fn chat_url_is_derived_from_endpoint_and_deployment() {
        struct NoToken;
        #[async_trait::async_trait]
        impl TokenCredential for NoToken {
            async fn access_token(&self) -> Result<String, ChatGatewayError> {
                unreachable!("not used in this test")
            }
        }

        let svc = AzureOpenAiService::new(
            "https://res.openai.azure.com/",
            "gpt-4o-mini",
            None,
            Arc::new(NoToken),
        )
        .unwrap();

        assert_eq!(
            svc.url_chat,
            "https://res.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions"
        );
    }

    #[test]
    fn invalid_endpoint_scheme_is_rejected() {
        struct NoToken;
        #[async_trait::async_trait]
        impl TokenCredential for NoToken {
            async fn access_token(&self) -> Result<String, ChatGatewayError> {
                unreachable!()
            }
        }

        let err = AzureOpenAiService::new("res.openai.azure.com", "gpt-4o", None, Arc::new(NoToken))
            .unwrap_err();
        assert!(matches!(err, ChatGatewayError::Config(_)));
    }
}
