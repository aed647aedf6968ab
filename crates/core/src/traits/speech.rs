//! Speech synthesis trait

use crate::{Result, SpeechArtifact};
use async_trait::async_trait;

/// Text-to-Speech interface
///
/// Implementations:
/// - `ElevenLabsTts` - hosted multilingual voice synthesis
///
/// The credential is passed per call because it is supplied by the user
/// for each session rather than configured once.
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize text and store the audio, returning where it was written
    async fn synthesize(&self, text: &str, credential: &str) -> Result<SpeechArtifact>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
