//! ElevenLabs speech synthesis

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use avatar_assistant_config::constants::{endpoints, timeouts, voice};
use avatar_assistant_config::VoiceConfig;
use avatar_assistant_core::{Result as CoreResult, SpeechArtifact, TextToSpeech};

use super::retention::{SPEECH_FILE_PREFIX, SPEECH_FILE_SUFFIX};
use crate::PipelineError;

/// ElevenLabs configuration
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API base URL
    pub endpoint: String,
    pub voice_id: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    /// Directory audio files are written to
    pub output_dir: PathBuf,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::ELEVENLABS_DEFAULT.to_string(),
            voice_id: voice::DEFAULT_VOICE_ID.to_string(),
            model_id: voice::DEFAULT_MODEL_ID.to_string(),
            stability: voice::DEFAULT_STABILITY,
            similarity_boost: voice::DEFAULT_SIMILARITY_BOOST,
            output_dir: std::env::temp_dir().join(voice::AUDIO_DIR_NAME),
            timeout: Duration::from_secs(timeouts::TTS_REQUEST_SECS),
        }
    }
}

impl ElevenLabsConfig {
    pub fn from_settings(settings: &VoiceConfig) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            voice_id: settings.voice_id.clone(),
            model_id: settings.model_id.clone(),
            stability: settings.stability,
            similarity_boost: settings.similarity_boost,
            output_dir: settings.output_dir.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// ElevenLabs TTS client
pub struct ElevenLabsTts {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabsTts {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn speech_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.voice_id
        )
    }

    /// `speech_{timestamp}_{suffix}.mp3`, unique per call
    fn next_file_name() -> String {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}{}_{}{}",
            SPEECH_FILE_PREFIX,
            timestamp,
            &suffix[..8],
            SPEECH_FILE_SUFFIX
        )
    }

    /// Synthesize `text` and write the audio to the output directory
    pub async fn try_synthesize(
        &self,
        text: &str,
        credential: &str,
    ) -> Result<SpeechArtifact, PipelineError> {
        if credential.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "Speech API key is not set".to_string(),
            ));
        }

        let request = SpeechRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        let response = self
            .client
            .post(self.speech_url())
            .header("xi-api-key", credential)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Tts(format!("HTTP {}: {}", status, error_text)));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(PipelineError::InvalidResponse(
                "Empty audio response".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let file_name = Self::next_file_name();
        let path = self.config.output_dir.join(&file_name);
        tokio::fs::write(&path, &audio).await?;

        tracing::debug!(
            path = %path.display(),
            bytes = audio.len(),
            voice_id = %self.config.voice_id,
            "Speech synthesized"
        );

        Ok(SpeechArtifact {
            path,
            file_name,
            size_bytes: audio.len(),
        })
    }
}

#[async_trait]
impl TextToSpeech for ElevenLabsTts {
    async fn synthesize(&self, text: &str, credential: &str) -> CoreResult<SpeechArtifact> {
        Ok(self.try_synthesize(text, credential).await?)
    }

    fn model_name(&self) -> &str {
        &self.config.model_id
    }
}
