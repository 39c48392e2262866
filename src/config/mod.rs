//! Gateway configuration: the plain data struct and env-driven constructors.

pub mod chat_config;
pub mod default_config;

pub use chat_config::{ChatConfig, DEFAULT_DEPLOYMENT};
pub use default_config::chat_config_from_env;
