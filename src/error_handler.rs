//! Unified error handling for `chat-gateway`.
//!
//! This module exposes a single top-level error type [`ChatGatewayError`] for
//! the whole library, and groups domain-specific errors in nested enums
//! ([`ConfigError`], [`CredentialError`], [`ProviderError`]). Small helpers
//! for reading environment variables and validating endpoints are provided
//! and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[Chat Gateway]` to simplify attribution
//! in logs. None of these errors ever crosses the gateway boundary verbatim:
//! `ChatGateway::get_response` collapses them to a fixed user-safe message.

use reqwest::StatusCode;
use thiserror::Error;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, ChatGatewayError>;

/// Maximum length of upstream body snippets embedded in error messages.
const SNIPPET_MAX: usize = 300;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `chat-gateway` crate.
///
/// Variants wrap domain-specific enums (config/credential/provider) and the
/// HTTP transport error. Prefer adding new sub-enums for distinct domains
/// instead of growing this type indefinitely.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChatGatewayError {
    /// Configuration/validation errors (construction time).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Token acquisition errors from the credential capability.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Errors surfaced by the completion provider (status, decode, payload).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[Chat Gateway] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for configuration-driven setup.
///
/// Keep this focused: only errors that realistically happen at gateway
/// construction time. A missing endpoint is NOT an error (the gateway
/// enters its disabled state instead).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Value had the wrong format (e.g., endpoint without an HTTP scheme).
    #[error("[Chat Gateway] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `AZUREAI_ENDPOINT`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A number failed to parse (like timeouts).
    #[error("[Chat Gateway] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `AZUREAI_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Credential errors                                                         */
/* ------------------------------------------------------------------------- */

/// Error enum for ambient-credential token acquisition.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The identity endpoint returned a non-successful HTTP status.
    #[error("[Chat Gateway] token endpoint returned HTTP {status}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// The token response could not be decoded as expected.
    #[error("[Chat Gateway] failed to decode token response: {0}")]
    Decode(String),

    /// The credential source is unreachable or refused the request.
    #[error("[Chat Gateway] credential source unavailable: {0}")]
    Unavailable(String),
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Error enum for the completion provider call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The endpoint is empty or does not start with http/https.
    #[error("[Chat Gateway] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("[Chat Gateway] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// Response payload could not be decoded as expected.
    #[error("[Chat Gateway] decode error: {0}")]
    Decode(String),

    /// The completion response carried no usable choice content.
    #[error("[Chat Gateway] completion response contained no content")]
    EmptyChoices,
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches an optional environment variable, treating empty/blank as unset.
pub fn env_opt(name: &'static str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ChatGatewayError::Config`] with [`ConfigError::InvalidNumber`]
/// if the variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<u64>().map(Some).map_err(|_| {
            ChatGatewayError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ChatGatewayError::Config`] with [`ConfigError::InvalidFormat`]
/// when the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Trims an upstream response body down to a single-line snippet safe to
/// embed in error messages and logs.
pub fn make_snippet(body: &str) -> String {
    let mut s: String = body
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(SNIPPET_MAX)
        .collect();
    if body.chars().count() > SNIPPET_MAX {
        s.push('…');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_single_line_and_bounded() {
        let body = "line one\nline two\r\nline three";
        let s = make_snippet(body);
        assert!(!s.contains('\n'));
        assert!(!s.contains('\r'));

        let long = "x".repeat(SNIPPET_MAX * 2);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), SNIPPET_MAX + 1);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn endpoint_validation_requires_http_scheme() {
        assert!(validate_http_endpoint("AZUREAI_ENDPOINT", "https://example.com").is_ok());
        assert!(validate_http_endpoint("AZUREAI_ENDPOINT", "http://localhost:8080").is_ok());
        assert!(validate_http_endpoint("AZUREAI_ENDPOINT", "example.com").is_err());
        assert!(validate_http_endpoint("AZUREAI_ENDPOINT", "ftp://example.com").is_err());
    }
}
