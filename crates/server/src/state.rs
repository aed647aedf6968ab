//! Application State
//!
//! Shared state across all handlers.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use avatar_assistant_agent::{
    AssistantBackends, AssistantConfig, AssistantProfile, AvatarAssistant, AvatarSettings,
    Credentials, ProfileUpdate,
};
use avatar_assistant_config::Settings;
use avatar_assistant_rag::KnowledgeBase;

use crate::session::SessionManager;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration, shared with the auth middleware
    pub config: Arc<RwLock<Settings>>,
    /// Session manager
    pub sessions: Arc<SessionManager>,
    /// Providers shared by every session
    pub backends: AssistantBackends,
    /// Corpus new sessions start with
    pub default_knowledge: Arc<KnowledgeBase>,
}

impl AppState {
    /// Create state with HTTP providers built from settings
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let backends = AssistantBackends::from_settings(&config)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        Ok(Self::with_backends(config, backends))
    }

    /// Create state with explicit providers
    pub fn with_backends(config: Settings, backends: AssistantBackends) -> Self {
        Self {
            sessions: Arc::new(
                SessionManager::from_settings(&config.sessions).with_audio_retention(
                    config.voice.output_dir.clone(),
                    Duration::from_secs(config.voice.audio_retention_seconds),
                ),
            ),
            config: Arc::new(RwLock::new(config)),
            backends,
            default_knowledge: Arc::new(KnowledgeBase::empty()),
        }
    }

    /// Corpus every new session starts with
    pub fn with_default_knowledge(mut self, knowledge: KnowledgeBase) -> Self {
        self.default_knowledge = Arc::new(knowledge);
        self
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    /// Build a session assistant. Settings supply the defaults, `update`
    /// overrides them.
    pub fn new_assistant(&self, update: ProfileUpdate) -> AvatarAssistant {
        let (assistant_config, mut profile) = {
            let config = self.config.read();
            let profile = AssistantProfile {
                credentials: Credentials::new(
                    config.llm.api_key.clone(),
                    config.voice.api_key.clone(),
                ),
                language: config.knowledge.default_language,
                avatar: AvatarSettings {
                    base_url: config.avatar.base_url.clone(),
                    image_url: config.avatar.image_url.clone(),
                },
            };
            (AssistantConfig::from_settings(&config), profile)
        };
        profile.apply(update);

        AvatarAssistant::new(
            assistant_config,
            self.backends.clone(),
            profile,
            self.default_knowledge.clone(),
        )
    }
}
