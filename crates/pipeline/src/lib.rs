//! Media pipeline for assistant replies
//!
//! Features:
//! - Text-to-speech via ElevenLabs, written to an audio file
//! - Age-based sweep of the audio output directory
//! - Talking-avatar video via an operator-hosted render service

pub mod avatar;
pub mod tts;

pub use avatar::AvatarVideoSynthesizer;
pub use tts::{sweep_expired_audio, ElevenLabsConfig, ElevenLabsTts};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Avatar error: {0}")]
    Avatar(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Network(err.to_string())
    }
}

impl From<PipelineError> for avatar_assistant_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Avatar(msg) => avatar_assistant_core::Error::Avatar(msg),
            PipelineError::Configuration(msg) => avatar_assistant_core::Error::Config(msg),
            PipelineError::Io(e) => avatar_assistant_core::Error::Io(e),
            other => avatar_assistant_core::Error::Speech(other.to_string()),
        }
    }
}
