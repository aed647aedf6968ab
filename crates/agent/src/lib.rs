//! Avatar Assistant Agent
//!
//! Features:
//! - Turn orchestration: knowledge filter, reply, speech, avatar video
//! - Append-only conversation log with paired user/assistant turns
//! - Per-session profile (credentials, language, avatar settings)
//! - Provider seams for testing with mock backends

pub mod assistant;
pub mod backends;
pub mod conversation;
pub mod profile;
pub mod traits;

pub use assistant::{AssistantConfig, AvatarAssistant, TurnOutcome, TurnStage, TurnTimings};
pub use backends::{AssistantBackends, SettingsModelProvider};
pub use conversation::ConversationLog;
pub use profile::{AssistantProfile, AvatarSettings, Credentials, ProfileUpdate};
pub use traits::ModelProvider;

use thiserror::Error;

/// User-facing message when a turn is attempted without both keys
pub const CREDENTIALS_MISSING_MESSAGE: &str = "Please configure your API keys first.";

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("{}", CREDENTIALS_MISSING_MESSAGE)]
    CredentialsMissing,

    #[error("Message is empty")]
    EmptyInput,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl From<avatar_assistant_llm::LlmError> for AgentError {
    fn from(err: avatar_assistant_llm::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}

impl From<avatar_assistant_pipeline::PipelineError> for AgentError {
    fn from(err: avatar_assistant_pipeline::PipelineError) -> Self {
        AgentError::Pipeline(err.to_string())
    }
}

impl From<AgentError> for avatar_assistant_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::CredentialsMissing => {
                avatar_assistant_core::Error::Config(CREDENTIALS_MISSING_MESSAGE.to_string())
            }
            AgentError::EmptyInput => {
                avatar_assistant_core::Error::InvalidInput("Message is empty".to_string())
            }
            AgentError::Llm(msg) => avatar_assistant_core::Error::Llm(msg),
            AgentError::Pipeline(msg) => avatar_assistant_core::Error::Speech(msg),
        }
    }
}
