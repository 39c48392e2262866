//! Default gateway config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `AZUREAI_ENDPOINT`        = base URL of the chat-completion resource
//!   (optional; absent/empty disables the gateway)
//! - `AZUREAI_DEPLOYMENT_NAME` = deployment/model identifier (optional,
//!   defaults to `gpt-4o` at resolution time)
//! - `AZUREAI_TIMEOUT_SECS`    = optional HTTP client timeout (u64, seconds)
//!
//! Empty/blank values are treated as unset, so a host can ship an empty
//! `AZUREAI_ENDPOINT=` line without tripping the gateway into a half-set
//! state.

use crate::{
    config::chat_config::ChatConfig,
    error_handler::{Result, env_opt, env_opt_u64},
};

/// Builds a [`ChatConfig`] from the `AZUREAI_*` environment variables.
///
/// A missing endpoint is not an error here: the gateway tolerates it and
/// reports the misconfiguration on use.
///
/// # Errors
/// Returns [`crate::error_handler::ConfigError::InvalidNumber`] if
/// `AZUREAI_TIMEOUT_SECS` is set but not a valid `u64`.
pub fn chat_config_from_env() -> Result<ChatConfig> {
    Ok(ChatConfig {
        endpoint: env_opt("AZUREAI_ENDPOINT"),
        deployment_name: env_opt("AZUREAI_DEPLOYMENT_NAME"),
        timeout_secs: env_opt_u64("AZUREAI_TIMEOUT_SECS")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "AZUREAI_ENDPOINT",
            "AZUREAI_DEPLOYMENT_NAME",
            "AZUREAI_TIMEOUT_SECS",
        ] {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn absent_variables_yield_empty_config() {
        clear_env();
        let cfg = chat_config_from_env().unwrap();
        assert_eq!(cfg.endpoint(), None);
        assert_eq!(cfg.deployment(), "gpt-4o");
        assert_eq!(cfg.timeout_secs, None);
    }

    #[test]
    #[serial]
    fn empty_endpoint_is_treated_as_unset() {
        clear_env();
        unsafe { std::env::set_var("AZUREAI_ENDPOINT", "   ") };
        let cfg = chat_config_from_env().unwrap();
        assert_eq!(cfg.endpoint(), None);
        clear_env();
    }

    #[test]
    #[serial]
    fn set_variables_are_picked_up() {
        clear_env();
        unsafe {
            std::env::set_var("AZUREAI_ENDPOINT", "https://res.openai.azure.com");
            std::env::set_var("AZUREAI_DEPLOYMENT_NAME", "gpt-4o-mini");
            std::env::set_var("AZUREAI_TIMEOUT_SECS", "30");
        }
        let cfg = chat_config_from_env().unwrap();
        assert_eq!(cfg.endpoint(), Some("https://res.openai.azure.com"));
        assert_eq!(cfg.deployment(), "gpt-4o-mini");
        assert_eq!(cfg.timeout_secs, Some(30));
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_timeout_is_rejected() {
        clear_env();
        unsafe { std::env::set_var("AZUREAI_TIMEOUT_SECS", "soon") };
        assert!(chat_config_from_env().is_err());
        clear_env();
    }
}
