//! LLM factory
//!
//! Creates the chat-completion backend for a session. The key is supplied per
//! session, so a backend is built whenever credentials change rather than once
//! at startup.

use std::sync::Arc;

use avatar_assistant_config::LlmConfig;
use avatar_assistant_core::LanguageModel;

use crate::backend::{OpenAIBackend, OpenAIConfig};
use crate::LlmError;

/// Builds `LanguageModel` instances from settings
pub struct LlmFactory;

impl LlmFactory {
    /// Create a backend for the given session key
    pub fn create(settings: &LlmConfig, api_key: &str) -> Result<Arc<dyn LanguageModel>, LlmError> {
        let config = OpenAIConfig::from_settings(settings, api_key);
        let backend = OpenAIBackend::new(config)?;

        tracing::debug!(
            endpoint = %settings.endpoint,
            model = %settings.model,
            "Created chat-completion backend"
        );

        Ok(Arc::new(backend))
    }
}
