//! Media artifacts produced for an assistant reply

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Audio written to disk by a speech backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechArtifact {
    /// Full path of the audio file
    pub path: PathBuf,
    /// File name inside the output directory
    pub file_name: String,
    /// Audio size in bytes
    pub size_bytes: usize,
}

impl SpeechArtifact {
    /// Reference used to hand the audio to another service.
    ///
    /// With a public base URL the file is addressed over HTTP, otherwise the
    /// local path is used.
    pub fn reference(&self, public_base: Option<&str>) -> String {
        match public_base {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), self.file_name),
            None => self.path.display().to_string(),
        }
    }
}

/// Body of a talking-avatar render request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarRequest {
    /// Reply text spoken by the avatar
    pub text: String,
    /// Reference to the synthesized speech, if any
    pub audio_url: Option<String>,
    /// Still image the avatar is animated from
    pub avatar_image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_reference() {
        let artifact = SpeechArtifact {
            path: PathBuf::from("/tmp/audio/speech_1.mp3"),
            file_name: "speech_1.mp3".to_string(),
            size_bytes: 10,
        };

        assert_eq!(artifact.reference(None), "/tmp/audio/speech_1.mp3");
        assert_eq!(
            artifact.reference(Some("https://assistant.example/media/audio/")),
            "https://assistant.example/media/audio/speech_1.mp3"
        );
    }
}
