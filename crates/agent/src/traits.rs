//! Agent seams for testability

use std::sync::Arc;

use avatar_assistant_core::LanguageModel;

use crate::AgentError;

/// Builds the chat model for a turn from the session's key.
///
/// The key can change between turns, so the model is resolved per turn rather
/// than held by the assistant.
pub trait ModelProvider: Send + Sync + 'static {
    fn language_model(&self, api_key: &str) -> Result<Arc<dyn LanguageModel>, AgentError>;
}

impl<F> ModelProvider for F
where
    F: Fn(&str) -> Result<Arc<dyn LanguageModel>, AgentError> + Send + Sync + 'static,
{
    fn language_model(&self, api_key: &str) -> Result<Arc<dyn LanguageModel>, AgentError> {
        self(api_key)
    }
}
