//! Configuration management for the avatar assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (AVATAR_ASSISTANT__ prefix, `__` separator)
//!
//! Provider credentials may be seeded here, but sessions normally carry
//! their own.

pub mod constants;
pub mod prompts;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, AuthConfig, AvatarConfig, KnowledgeConfig, LlmConfig,
    ObservabilityConfig, RuntimeEnvironment, ServerConfig, SessionConfig, Settings, VoiceConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for avatar_assistant_core::Error {
    fn from(err: ConfigError) -> Self {
        avatar_assistant_core::Error::Config(err.to_string())
    }
}
