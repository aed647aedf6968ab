//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use avatar_assistant_core::LanguagePreference;

use crate::constants::{endpoints, llm, sessions, timeouts, voice};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat completion configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Voice synthesis configuration
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Avatar video configuration
    #[serde(default)]
    pub avatar: AvatarConfig,

    /// Knowledge base configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Session limits
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_voice()?;
        self.validate_avatar()?;
        self.validate_sessions()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if let Some(base) = &server.public_base_url {
            if !is_http_url(base) {
                return Err(ConfigError::InvalidValue {
                    field: "server.public_base_url".to_string(),
                    message: format!("Must be an http(s) URL, got '{}'", base),
                });
            }
        }

        // Auth validation in production
        if self.environment.is_production() && server.auth.enabled && server.auth.api_key.is_none()
        {
            return Err(ConfigError::InvalidValue {
                field: "server.auth.api_key".to_string(),
                message: "API key must be set when auth is enabled in production".to_string(),
            });
        }

        if self.environment.is_strict() && !server.auth.enabled {
            tracing::warn!(
                environment = ?self.environment,
                "API authentication is disabled outside development"
            );
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !is_http_url(&llm.endpoint) {
            return Err(ConfigError::InvalidValue {
                field: "llm.endpoint".to_string(),
                message: format!("Must be an http(s) URL, got '{}'", llm.endpoint),
            });
        }

        if llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()));
        }

        if llm.max_tokens == 0 || llm.max_tokens > 4096 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: format!("Must be between 1 and 4096, got {}", llm.max_tokens),
            });
        }

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_voice(&self) -> Result<(), ConfigError> {
        let voice = &self.voice;

        if !is_http_url(&voice.endpoint) {
            return Err(ConfigError::InvalidValue {
                field: "voice.endpoint".to_string(),
                message: format!("Must be an http(s) URL, got '{}'", voice.endpoint),
            });
        }

        if voice.voice_id.trim().is_empty() {
            return Err(ConfigError::MissingField("voice.voice_id".to_string()));
        }

        for (field, value) in [
            ("voice.stability", voice.stability),
            ("voice.similarity_boost", voice.similarity_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 1.0, got {}", value),
                });
            }
        }

        if voice.audio_retention_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "voice.audio_retention_seconds".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if voice.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "voice.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_avatar(&self) -> Result<(), ConfigError> {
        let avatar = &self.avatar;

        if let Some(base) = &avatar.base_url {
            if !is_http_url(base) {
                return Err(ConfigError::InvalidValue {
                    field: "avatar.base_url".to_string(),
                    message: format!("Must be an http(s) URL, got '{}'", base),
                });
            }
        }

        if avatar.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "avatar.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_sessions(&self) -> Result<(), ConfigError> {
        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.sessions.cleanup_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.cleanup_interval_seconds".to_string(),
                message: "Must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds (covers a whole turn)
    #[serde(default = "default_server_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Externally reachable base URL of this server.
    /// When set, synthesized audio is handed to the avatar service as
    /// `{public_base_url}/media/audio/{file}`.
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Enable authentication (set to false for development)
    #[serde(default)]
    pub enabled: bool,

    /// API key (set via AVATAR_ASSISTANT__SERVER__AUTH__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Paths that bypass authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/health".to_string(),
        "/ready".to_string(),
        "/metrics".to_string(),
        "/media/audio".to_string(),
    ]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            public_paths: default_public_paths(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_server_timeout() -> u64 {
    300
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_server_timeout(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
            public_base_url: None,
            auth: AuthConfig::default(),
        }
    }
}

/// Chat completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API endpoint
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Output bound per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    /// Fallback API key for sessions created without one
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_llm_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}
fn default_llm_model() -> String {
    llm::DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> u32 {
    llm::DEFAULT_MAX_TOKENS
}
fn default_temperature() -> f32 {
    llm::DEFAULT_TEMPERATURE
}
fn default_llm_timeout() -> u64 {
    timeouts::LLM_REQUEST_SECS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_llm_timeout(),
            api_key: None,
        }
    }
}

/// Voice synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Speech API endpoint
    #[serde(default = "default_voice_endpoint")]
    pub endpoint: String,

    /// Fixed voice identity
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Multilingual synthesis model
    #[serde(default = "default_voice_model")]
    pub model_id: String,

    #[serde(default = "default_stability")]
    pub stability: f32,

    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,

    /// Directory audio files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Request timeout in seconds
    #[serde(default = "default_voice_timeout")]
    pub timeout_seconds: u64,

    /// Audio files older than this are deleted by the cleanup task
    #[serde(default = "default_audio_retention")]
    pub audio_retention_seconds: u64,

    /// Fallback API key for sessions created without one
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_voice_endpoint() -> String {
    endpoints::ELEVENLABS_DEFAULT.to_string()
}
fn default_voice_id() -> String {
    voice::DEFAULT_VOICE_ID.to_string()
}
fn default_voice_model() -> String {
    voice::DEFAULT_MODEL_ID.to_string()
}
fn default_stability() -> f32 {
    voice::DEFAULT_STABILITY
}
fn default_similarity_boost() -> f32 {
    voice::DEFAULT_SIMILARITY_BOOST
}
fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join(voice::AUDIO_DIR_NAME)
}
fn default_voice_timeout() -> u64 {
    timeouts::TTS_REQUEST_SECS
}
fn default_audio_retention() -> u64 {
    voice::AUDIO_RETENTION_SECS
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_voice_endpoint(),
            voice_id: default_voice_id(),
            model_id: default_voice_model(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            output_dir: default_output_dir(),
            timeout_seconds: default_voice_timeout(),
            audio_retention_seconds: default_audio_retention(),
            api_key: None,
        }
    }
}

/// Avatar video configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Default base URL of the operator-hosted generation service
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default avatar still image
    #[serde(default)]
    pub image_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_avatar_timeout")]
    pub timeout_seconds: u64,
}

fn default_avatar_timeout() -> u64 {
    timeouts::AVATAR_REQUEST_SECS
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            image_url: None,
            timeout_seconds: default_avatar_timeout(),
        }
    }
}

/// Knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowledgeConfig {
    /// Directory of `.txt`/`.md` files loaded as every session's initial corpus
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Default reply language for new sessions
    #[serde(default)]
    pub default_language: LanguagePreference,
}

/// Session limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Inactivity timeout in seconds
    #[serde(default = "default_session_timeout")]
    pub timeout_seconds: u64,

    /// Interval between expired-session sweeps
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_max_sessions() -> usize {
    sessions::DEFAULT_MAX_SESSIONS
}
fn default_session_timeout() -> u64 {
    sessions::DEFAULT_TIMEOUT_SECS
}
fn default_cleanup_interval() -> u64 {
    sessions::DEFAULT_CLEANUP_INTERVAL_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            timeout_seconds: default_session_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (AVATAR_ASSISTANT__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings using an explicit config directory
pub fn load_settings_from(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(config_dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(config_dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("AVATAR_ASSISTANT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
