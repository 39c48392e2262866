//! Ambient credential capability for the gateway.
//!
//! The gateway never reads a static API key from configuration. Instead it
//! takes an opaque [`TokenCredential`] at construction and asks it for a
//! bearer token on each outbound call. The shipped implementation,
//! [`ImdsManagedIdentityCredential`], resolves tokens from the Azure
//! Instance Metadata Service, so a deployed host authenticates with its
//! managed identity and no secret ever lives in the gateway's config.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::error_handler::{ChatGatewayError, CredentialError, make_snippet};

/// Token endpoint of the Azure Instance Metadata Service.
const IMDS_TOKEN_URL: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// IMDS protocol version.
const IMDS_API_VERSION: &str = "2018-02-01";

/// Audience for which tokens are requested.
const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

/// Tokens are refreshed this long before their reported expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(120);

/// Capability that produces bearer tokens for the completion endpoint.
///
/// Implementations must be cheap to call repeatedly: the gateway requests a
/// token per outbound completion and relies on the credential to cache.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a bearer token valid for the chat-completion resource.
    async fn access_token(&self) -> Result<String, ChatGatewayError>;
}

/// Managed-identity credential backed by the Azure IMDS endpoint.
///
/// Fetches `GET {token_url}?api-version=...&resource=...` with the
/// `Metadata: true` header and caches the token until shortly before the
/// reported expiry. Safe to share behind an `Arc` across concurrent calls;
/// the cache is read-mostly.
pub struct ImdsManagedIdentityCredential {
    client: reqwest::Client,
    token_url: String,
    resource: String,
    cache: RwLock<Option<CachedToken>>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Token payload returned by IMDS. Numeric fields arrive as strings.
#[derive(Deserialize)]
struct ImdsTokenResponse {
    access_token: String,
    expires_in: String,
}

impl ImdsManagedIdentityCredential {
    /// Creates a credential against the standard IMDS endpoint.
    ///
    /// # Errors
    /// Returns [`ChatGatewayError::HttpTransport`] if the HTTP client cannot
    /// be built.
    pub fn new() -> Result<Self, ChatGatewayError> {
        Self::with_token_url(IMDS_TOKEN_URL)
    }

    /// Creates a credential against a non-standard identity endpoint.
    ///
    /// Useful for hosts that proxy the metadata service.
    pub fn with_token_url(token_url: impl Into<String>) -> Result<Self, ChatGatewayError> {
        // IMDS answers on the local link within milliseconds; anything
        // slower than this means the host has no usable identity.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            token_url: token_url.into(),
            resource: COGNITIVE_SERVICES_RESOURCE.to_string(),
            cache: RwLock::new(None),
        })
    }

    async fn fetch_token(&self) -> Result<CachedToken, ChatGatewayError> {
        debug!(resource = %self.resource, "GET {}", self.token_url);

        let resp = self
            .client
            .get(&self.token_url)
            .query(&[
                ("api-version", IMDS_API_VERSION),
                ("resource", self.resource.as_str()),
            ])
            .header("Metadata", "true")
            .send()
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(%status, %snippet, "identity endpoint returned non-success status");

            return Err(CredentialError::HttpStatus { status, snippet }.into());
        }

        let out: ImdsTokenResponse = resp
            .json()
            .await
            .map_err(|e| CredentialError::Decode(format!("serde error: {e}")))?;

        let expires_in = out.expires_in.parse::<u64>().map_err(|_| {
            CredentialError::Decode(format!("non-numeric expires_in: {}", out.expires_in))
        })?;

        let lifetime = Duration::from_secs(expires_in).saturating_sub(REFRESH_MARGIN);

        info!(expires_in, "acquired managed-identity token");

        Ok(CachedToken {
            token: out.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}

/// Credential that hands out one fixed bearer token.
///
/// For local development (e.g., a token minted with
/// `az account get-access-token`) and for tests. Production hosts should
/// prefer [`ImdsManagedIdentityCredential`].
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    /// Wraps an already-acquired bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn access_token(&self) -> Result<String, ChatGatewayError> {
        Ok(self.token.clone())
    }
}

#[async_trait]
impl TokenCredential for ImdsManagedIdentityCredential {
    async fn access_token(&self) -> Result<String, ChatGatewayError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let mut w = self.cache.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(cached) = w.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *w = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use serde_json::json;

    fn token_body(token: &str, expires_in: &str) -> serde_json::Value {
        json!({
            "access_token": token,
            "expires_in": expires_in,
            "token_type": "Bearer",
            "resource": COGNITIVE_SERVICES_RESOURCE,
        })
    }

    #[tokio::test]
    async fn fetches_and_caches_token_until_expiry() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/metadata/identity/oauth2/token"),
                request::query(url_decoded(contains(("resource", COGNITIVE_SERVICES_RESOURCE)))),
                request::headers(contains(("metadata", "true"))),
            ])
            .times(1)
            .respond_with(json_encoded(token_body("tok-1", "86399"))),
        );

        let cred = ImdsManagedIdentityCredential::with_token_url(
            server.url_str("/metadata/identity/oauth2/token"),
        )
        .unwrap();

        assert_eq!(cred.access_token().await.unwrap(), "tok-1");
        // Second call must be served from the cache (times(1) above).
        assert_eq!(cred.access_token().await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed() {
        let server = Server::run();
        // expires_in below the refresh margin: the first token is already
        // considered stale on the next call.
        server.expect(
            Expectation::matching(request::method_path(
                "GET",
                "/metadata/identity/oauth2/token",
            ))
            .times(2)
            .respond_with(json_encoded(token_body("tok", "30"))),
        );

        let cred = ImdsManagedIdentityCredential::with_token_url(
            server.url_str("/metadata/identity/oauth2/token"),
        )
        .unwrap();

        assert_eq!(cred.access_token().await.unwrap(), "tok");
        assert_eq!(cred.access_token().await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_credential_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "GET",
                "/metadata/identity/oauth2/token",
            ))
            .respond_with(status_code(400).body("no identity assigned")),
        );

        let cred = ImdsManagedIdentityCredential::with_token_url(
            server.url_str("/metadata/identity/oauth2/token"),
        )
        .unwrap();

        let err = cred.access_token().await.unwrap_err();
        assert!(matches!(
            err,
            ChatGatewayError::Credential(CredentialError::HttpStatus { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_token_payload_maps_to_decode_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "GET",
                "/metadata/identity/oauth2/token",
            ))
            .respond_with(json_encoded(json!({ "unexpected": true }))),
        );

        let cred = ImdsManagedIdentityCredential::with_token_url(
            server.url_str("/metadata/identity/oauth2/token"),
        )
        .unwrap();

        let err = cred.access_token().await.unwrap_err();
        assert!(matches!(
            err,
            ChatGatewayError::Credential(CredentialError::Decode(_))
        ));
    }
}
