//! Per-session assistant profile
//!
//! Everything the user configures for a session: provider keys, reply
//! language and avatar settings. Never persisted.

use serde::{Deserialize, Serialize};

use avatar_assistant_core::LanguagePreference;

use crate::AgentError;

/// Provider API keys supplied by the user
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub llm_api_key: Option<String>,
    pub voice_api_key: Option<String>,
}

impl Credentials {
    pub fn new(llm_api_key: Option<String>, voice_api_key: Option<String>) -> Self {
        Self {
            llm_api_key: non_blank(llm_api_key),
            voice_api_key: non_blank(voice_api_key),
        }
    }

    /// Both keys are present
    pub fn is_configured(&self) -> bool {
        self.llm_api_key.is_some() && self.voice_api_key.is_some()
    }

    /// Return `(llm_key, voice_key)` or `CredentialsMissing`
    pub fn require(&self) -> Result<(String, String), AgentError> {
        match (&self.llm_api_key, &self.voice_api_key) {
            (Some(llm), Some(voice)) => Ok((llm.clone(), voice.clone())),
            _ => Err(AgentError::CredentialsMissing),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("voice_api_key", &self.voice_api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Avatar render target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarSettings {
    /// Base URL of the render service
    pub base_url: Option<String>,
    /// Still image the avatar is animated from
    pub image_url: Option<String>,
}

impl AvatarSettings {
    /// Base URL and image, when both are set
    pub fn target(&self) -> Option<(&str, &str)> {
        match (&self.base_url, &self.image_url) {
            (Some(base), Some(image)) => Some((base.as_str(), image.as_str())),
            _ => None,
        }
    }
}

/// Session configuration used by every turn
#[derive(Debug, Clone, Default)]
pub struct AssistantProfile {
    pub credentials: Credentials,
    pub language: LanguagePreference,
    pub avatar: AvatarSettings,
}

/// Partial profile change. `None` leaves a field untouched, a blank string
/// clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub llm_api_key: Option<String>,
    #[serde(default)]
    pub voice_api_key: Option<String>,
    #[serde(default)]
    pub language: Option<LanguagePreference>,
    #[serde(default)]
    pub avatar_base_url: Option<String>,
    #[serde(default)]
    pub avatar_image_url: Option<String>,
}

impl AssistantProfile {
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(key) = update.llm_api_key {
            self.credentials.llm_api_key = non_blank(Some(key));
        }
        if let Some(key) = update.voice_api_key {
            self.credentials.voice_api_key = non_blank(Some(key));
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(base) = update.avatar_base_url {
            self.avatar.base_url = non_blank(Some(base));
        }
        if let Some(image) = update.avatar_image_url {
            self.avatar.image_url = non_blank(Some(image));
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both() {
        let creds = Credentials::new(Some("sk-1".to_string()), None);
        assert!(!creds.is_configured());
        assert!(matches!(creds.require(), Err(AgentError::CredentialsMissing)));

        let creds = Credentials::new(Some("sk-1".to_string()), Some("  ".to_string()));
        assert!(!creds.is_configured());

        let creds = Credentials::new(Some("sk-1".to_string()), Some("el-1".to_string()));
        assert_eq!(creds.require().unwrap(), ("sk-1".to_string(), "el-1".to_string()));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let creds = Credentials::new(Some("sk-secret".to_string()), Some("el-secret".to_string()));
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_apply_update() {
        let mut profile = AssistantProfile::default();
        profile.apply(ProfileUpdate {
            llm_api_key: Some("sk-1".to_string()),
            language: Some(LanguagePreference::Hindi),
            avatar_base_url: Some("http://render.local".to_string()),
            ..Default::default()
        });

        assert_eq!(profile.credentials.llm_api_key.as_deref(), Some("sk-1"));
        assert_eq!(profile.language, LanguagePreference::Hindi);
        assert!(profile.avatar.target().is_none());

        profile.apply(ProfileUpdate {
            avatar_image_url: Some("http://images.local/face.png".to_string()),
            llm_api_key: Some(String::new()),
            ..Default::default()
        });

        assert!(profile.credentials.llm_api_key.is_none());
        assert_eq!(
            profile.avatar.target(),
            Some(("http://render.local", "http://images.local/face.png"))
        );
    }
}
