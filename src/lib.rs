//! Chat gateway for the Zava Storefront.
//!
//! One public component: [`ChatGateway`]. It accepts a plain-text customer
//! message, forwards it (with a fixed system prompt) to the configured
//! chat-completion deployment, and returns either the generated reply or a
//! user-safe error message as a [`ChatResult`].
//!
//! Authentication uses an ambient [`TokenCredential`] capability (managed
//! identity via [`ImdsManagedIdentityCredential`] in production) — no static
//! API key in configuration. A missing endpoint disables the gateway
//! instead of failing startup; the misconfiguration is surfaced on use.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use chat_gateway::{ChatGateway, ImdsManagedIdentityCredential};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = Arc::new(ImdsManagedIdentityCredential::new()?);
//! let gateway = Arc::new(ChatGateway::from_env(credential)?);
//!
//! let result = gateway.get_response("What are your store hours?").await;
//! println!("{}", result.response.or(result.error).unwrap());
//! # Ok(()) }
//! ```

pub mod config;
pub mod credentials;
pub mod error_handler;
pub mod gateway;
pub mod health_service;
pub mod services;
pub mod telemetry;

pub use config::{ChatConfig, DEFAULT_DEPLOYMENT, chat_config_from_env};
pub use credentials::{ImdsManagedIdentityCredential, StaticTokenCredential, TokenCredential};
pub use error_handler::{ChatGatewayError, Result};
pub use gateway::{ChatGateway, ChatResult, GENERIC_ERROR_MESSAGE, NOT_CONFIGURED_MESSAGE, SYSTEM_PROMPT};
pub use health_service::HealthStatus;
