//! Avatar assistant turn orchestration
//!
//! One turn runs sequentially:
//! 1. Knowledge filter over the session corpus
//! 2. Reply generation (failures become an apology)
//! 3. Speech synthesis, skipped for apologies
//! 4. Avatar video, when a render target is configured
//! 5. Exchange appended to the conversation log
//!
//! Turns within one session are serialised.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Mutex;

use avatar_assistant_config::Settings;
use avatar_assistant_core::{AvatarRequest, SpeechArtifact, Turn};
use avatar_assistant_llm::{GeneratedReply, ResponseGenerator};
use avatar_assistant_rag::KnowledgeBase;

use crate::backends::AssistantBackends;
use crate::conversation::ConversationLog;
use crate::profile::{AssistantProfile, ProfileUpdate};
use crate::AgentError;

/// Static assistant parameters
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Public URL prefix under which audio files are served. Without it the
    /// render service receives the local file path.
    pub audio_public_base: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_tokens: avatar_assistant_config::constants::llm::DEFAULT_MAX_TOKENS,
            temperature: avatar_assistant_config::constants::llm::DEFAULT_TEMPERATURE,
            audio_public_base: None,
        }
    }
}

impl AssistantConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_tokens: settings.llm.max_tokens,
            temperature: settings.llm.temperature,
            audio_public_base: settings
                .server
                .public_base_url
                .as_ref()
                .map(|base| format!("{}/media/audio", base.trim_end_matches('/'))),
        }
    }
}

/// External call made during a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    Llm,
    Tts,
    Avatar,
}

impl TurnStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnStage::Llm => "llm",
            TurnStage::Tts => "tts",
            TurnStage::Avatar => "avatar",
        }
    }
}

/// Wall-clock time spent per stage
#[derive(Debug, Clone, Default)]
pub struct TurnTimings {
    pub llm: Duration,
    pub tts: Option<Duration>,
    pub avatar: Option<Duration>,
    pub total: Duration,
}

/// Result of one turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Reply text, possibly an apology
    pub text: String,
    pub is_apology: bool,
    /// Synthesized speech, when it succeeded
    pub audio: Option<SpeechArtifact>,
    /// Reference handed to the render service
    pub audio_ref: Option<String>,
    /// Avatar video URL, when one was produced
    pub video_url: Option<String>,
    /// User-visible notices about degraded stages
    pub notices: Vec<String>,
    /// Stages that failed
    pub failures: Vec<TurnStage>,
    /// Turns in the conversation after this one
    pub turn_count: usize,
    pub timings: TurnTimings,
}

/// Session-scoped assistant
pub struct AvatarAssistant {
    config: AssistantConfig,
    backends: AssistantBackends,
    profile: RwLock<AssistantProfile>,
    knowledge: RwLock<Arc<KnowledgeBase>>,
    conversation: ConversationLog,
    turn_lock: Mutex<()>,
}

impl AvatarAssistant {
    pub fn new(
        config: AssistantConfig,
        backends: AssistantBackends,
        profile: AssistantProfile,
        knowledge: Arc<KnowledgeBase>,
    ) -> Self {
        Self {
            config,
            backends,
            profile: RwLock::new(profile),
            knowledge: RwLock::new(knowledge),
            conversation: ConversationLog::new(),
            turn_lock: Mutex::new(()),
        }
    }

    pub fn profile(&self) -> AssistantProfile {
        self.profile.read().clone()
    }

    pub fn update_profile(&self, update: ProfileUpdate) {
        self.profile.write().apply(update);
    }

    pub fn knowledge(&self) -> Arc<KnowledgeBase> {
        self.knowledge.read().clone()
    }

    /// Replace the session corpus
    pub fn replace_knowledge(&self, knowledge: KnowledgeBase) {
        *self.knowledge.write() = Arc::new(knowledge);
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    /// Run one turn for `text`
    pub async fn process_turn(&self, text: &str) -> Result<TurnOutcome, AgentError> {
        let _turn = self.turn_lock.lock().await;

        let profile = self.profile();
        let (llm_key, voice_key) = profile.credentials.require()?;

        if text.trim().is_empty() {
            return Err(AgentError::EmptyInput);
        }

        let started = Instant::now();
        let mut timings = TurnTimings::default();
        let mut notices = Vec::new();
        let mut failures = Vec::new();

        let snippet = self.knowledge().search(text);
        tracing::debug!(snippet_lines = snippet.lines().count(), "Knowledge filter applied");

        let llm_started = Instant::now();
        let reply = self.generate_reply(text, &profile, &llm_key, &snippet).await;
        timings.llm = llm_started.elapsed();
        if reply.is_apology {
            failures.push(TurnStage::Llm);
        }

        let mut audio = None;
        let mut audio_ref = None;
        let mut video_url = None;

        if !reply.is_apology {
            let tts_started = Instant::now();
            match self.backends.tts.synthesize(&reply.text, &voice_key).await {
                Ok(artifact) => {
                    audio_ref = Some(artifact.reference(self.config.audio_public_base.as_deref()));
                    audio = Some(artifact);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Speech synthesis failed");
                    notices.push(format!("Voice generation error: {}", e));
                    failures.push(TurnStage::Tts);
                }
            }
            timings.tts = Some(tts_started.elapsed());

            if let Some((base_url, image_url)) = profile.avatar.target() {
                let request = AvatarRequest {
                    text: reply.text.clone(),
                    audio_url: audio_ref.clone(),
                    avatar_image: image_url.to_string(),
                };

                let avatar_started = Instant::now();
                video_url = self.backends.avatar.render(base_url, &request).await;
                timings.avatar = Some(avatar_started.elapsed());
                if video_url.is_none() {
                    failures.push(TurnStage::Avatar);
                }
            }
        }

        let turn_count = self.conversation.record_exchange(
            Turn::user(text),
            Turn::assistant(reply.text.clone()).with_media(video_url.clone()),
        );
        timings.total = started.elapsed();

        tracing::info!(
            turn_count,
            is_apology = reply.is_apology,
            has_audio = audio.is_some(),
            has_video = video_url.is_some(),
            total_ms = timings.total.as_millis() as u64,
            "Turn completed"
        );

        Ok(TurnOutcome {
            text: reply.text,
            is_apology: reply.is_apology,
            audio,
            audio_ref,
            video_url,
            notices,
            failures,
            turn_count,
            timings,
        })
    }

    async fn generate_reply(
        &self,
        text: &str,
        profile: &AssistantProfile,
        llm_key: &str,
        snippet: &str,
    ) -> GeneratedReply {
        let llm = match self.backends.models.language_model(llm_key) {
            Ok(llm) => llm,
            Err(e) => {
                tracing::warn!(error = %e, "Chat model unavailable, replying with apology");
                return GeneratedReply::apology(&e.to_string());
            }
        };

        ResponseGenerator::new(llm, self.config.max_tokens, self.config.temperature)
            .generate(text, profile.language, snippet)
            .await
    }
}
