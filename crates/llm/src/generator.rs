//! Reply generation
//!
//! Wraps a `LanguageModel` with the assistant's system instruction. A failed
//! completion is turned into an apology reply so a turn always has text.

use std::sync::Arc;

use avatar_assistant_config::prompts;
use avatar_assistant_core::{GenerateRequest, LanguageModel, LanguagePreference};

/// Text produced for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub text: String,
    /// True when `text` is the apology substituted for a failed completion
    pub is_apology: bool,
}

impl GeneratedReply {
    pub fn completed(text: String) -> Self {
        Self {
            text,
            is_apology: false,
        }
    }

    /// Apology reply carrying the failure text
    pub fn apology(error: &str) -> Self {
        Self {
            text: prompts::apology(error),
            is_apology: true,
        }
    }
}

/// Produces the assistant reply for a user message
pub struct ResponseGenerator {
    llm: Arc<dyn LanguageModel>,
    max_tokens: u32,
    temperature: f32,
}

impl ResponseGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            llm,
            max_tokens,
            temperature,
        }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Build the `[system, user]` request for one turn
    pub fn build_request(
        &self,
        user_text: &str,
        language: LanguagePreference,
        knowledge_snippet: &str,
    ) -> GenerateRequest {
        GenerateRequest::new(prompts::system_prompt(language, knowledge_snippet))
            .with_user_message(user_text)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }

    /// Generate the reply. Never fails.
    pub async fn generate(
        &self,
        user_text: &str,
        language: LanguagePreference,
        knowledge_snippet: &str,
    ) -> GeneratedReply {
        let request = self.build_request(user_text, language, knowledge_snippet);

        match self.llm.generate(request).await {
            Ok(response) => GeneratedReply::completed(response.text),
            Err(e) => {
                tracing::warn!(
                    model = %self.llm.model_name(),
                    error = %e,
                    "Chat completion failed, replying with apology"
                );
                GeneratedReply::apology(&e.to_string())
            }
        }
    }
}
