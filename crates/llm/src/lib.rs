//! Chat-completion integration
//!
//! Features:
//! - OpenAI-compatible backend behind `core::LanguageModel`
//! - Factory building a backend from settings and a per-session key
//! - Reply generation that never fails (errors become an apology reply)

pub mod backend;
pub mod factory;
pub mod generator;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use factory::LlmFactory;
pub use generator::{GeneratedReply, ResponseGenerator};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for avatar_assistant_core::Error {
    fn from(err: LlmError) -> Self {
        avatar_assistant_core::Error::Llm(err.to_string())
    }
}
