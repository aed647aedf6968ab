//! Core error type shared by every backend trait

use thiserror::Error;

/// Errors surfaced through the core traits
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Avatar video error: {0}")]
    Avatar(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result alias used by the core traits
pub type Result<T> = std::result::Result<T, Error>;
