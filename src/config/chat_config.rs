/// Deployment used when `deployment_name` is not configured.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

/// Configuration for the chat gateway.
///
/// Read once at gateway construction and immutable for the process lifetime.
/// Both settings are optional: a missing endpoint disables the gateway
/// (surfaced on use, never at construction), and a missing deployment name
/// falls back to [`DEFAULT_DEPLOYMENT`].
///
/// # Fields
///
/// - `endpoint`: Base URL of the chat-completion resource.
/// - `deployment_name`: Which hosted deployment/model serves requests.
/// - `timeout_secs`: Optional HTTP client timeout in seconds.
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    /// Base endpoint URL (e.g., `https://myresource.openai.azure.com`).
    /// `None` or empty puts the gateway in its disabled state.
    pub endpoint: Option<String>,

    /// Deployment/model identifier (e.g., `"gpt-4o"`).
    pub deployment_name: Option<String>,

    /// Optional request timeout (in seconds) for the underlying client.
    pub timeout_secs: Option<u64>,
}

impl ChatConfig {
    /// Returns the configured endpoint if present and non-blank.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Resolves the deployment name, falling back to [`DEFAULT_DEPLOYMENT`].
    pub fn deployment(&self) -> &str {
        self.deployment_name
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DEPLOYMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_falls_back_to_default() {
        let cfg = ChatConfig::default();
        assert_eq!(cfg.deployment(), DEFAULT_DEPLOYMENT);

        let cfg = ChatConfig {
            deployment_name: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.deployment(), DEFAULT_DEPLOYMENT);

        let cfg = ChatConfig {
            deployment_name: Some("foo".into()),
            ..Default::default()
        };
        assert_eq!(cfg.deployment(), "foo");
    }

    #[test]
    fn blank_endpoint_counts_as_absent() {
        let cfg = ChatConfig {
            endpoint: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.endpoint(), None);

        let cfg = ChatConfig {
            endpoint: Some("https://example.openai.azure.com".into()),
            ..Default::default()
        };
        assert_eq!(cfg.endpoint(), Some("https://example.openai.azure.com"));
    }
}
