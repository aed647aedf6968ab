//! Provider wiring
//!
//! Groups the three external providers a turn talks to, built from settings
//! for production or injected directly in tests.

use std::sync::Arc;

use avatar_assistant_config::{LlmConfig, Settings};
use avatar_assistant_core::{AvatarRenderer, LanguageModel, TextToSpeech};
use avatar_assistant_llm::LlmFactory;
use avatar_assistant_pipeline::{AvatarVideoSynthesizer, ElevenLabsConfig, ElevenLabsTts};

use crate::traits::ModelProvider;
use crate::AgentError;

/// `ModelProvider` backed by the OpenAI-compatible factory
pub struct SettingsModelProvider {
    settings: LlmConfig,
}

impl SettingsModelProvider {
    pub fn new(settings: LlmConfig) -> Self {
        Self { settings }
    }
}

impl ModelProvider for SettingsModelProvider {
    fn language_model(&self, api_key: &str) -> Result<Arc<dyn LanguageModel>, AgentError> {
        Ok(LlmFactory::create(&self.settings, api_key)?)
    }
}

/// Shared provider handles
#[derive(Clone)]
pub struct AssistantBackends {
    pub models: Arc<dyn ModelProvider>,
    pub tts: Arc<dyn TextToSpeech>,
    pub avatar: Arc<dyn AvatarRenderer>,
}

impl AssistantBackends {
    pub fn new(
        models: Arc<dyn ModelProvider>,
        tts: Arc<dyn TextToSpeech>,
        avatar: Arc<dyn AvatarRenderer>,
    ) -> Self {
        Self { models, tts, avatar }
    }

    /// Real HTTP providers configured from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        let tts = ElevenLabsTts::new(ElevenLabsConfig::from_settings(&settings.voice))?;
        let avatar = AvatarVideoSynthesizer::from_settings(&settings.avatar)?;

        tracing::info!(
            llm_model = %settings.llm.model,
            voice_model = %settings.voice.model_id,
            audio_dir = %settings.voice.output_dir.display(),
            "Assistant backends initialized"
        );

        Ok(Self {
            models: Arc::new(SettingsModelProvider::new(settings.llm.clone())),
            tts: Arc::new(tts),
            avatar: Arc::new(avatar),
        })
    }
}
