//! Centralized constants for the avatar assistant
//!
//! Single source of truth for provider defaults and limits, so the settings
//! defaults and the client crates never disagree.

/// Service endpoints
pub mod endpoints {
    /// OpenAI API endpoint
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// ElevenLabs API endpoint
    pub const ELEVENLABS_DEFAULT: &str = "https://api.elevenlabs.io";

    /// Path appended to the avatar service base URL
    pub const AVATAR_GENERATE_PATH: &str = "/generate_avatar";
}

/// Chat completion defaults
pub mod llm {
    /// Chat model
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

    /// Output bound for each reply
    pub const DEFAULT_MAX_TOKENS: u32 = 200;

    /// Sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
}

/// Voice synthesis defaults
pub mod voice {
    /// Fixed voice identity ("Rachel")
    pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

    /// Multilingual synthesis model (handles English and Hindi)
    pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

    pub const DEFAULT_STABILITY: f32 = 0.5;
    pub const DEFAULT_SIMILARITY_BOOST: f32 = 0.5;

    /// Directory name under the system temp dir for audio output
    pub const AUDIO_DIR_NAME: &str = "avatar-assistant-audio";

    /// Age after which synthesized audio files are swept
    pub const AUDIO_RETENTION_SECS: u64 = 3600;
}

/// Timeouts (in seconds)
pub mod timeouts {
    /// Chat completion request timeout
    pub const LLM_REQUEST_SECS: u64 = 60;

    /// Speech synthesis request timeout
    pub const TTS_REQUEST_SECS: u64 = 60;

    /// Avatar render request timeout
    pub const AVATAR_REQUEST_SECS: u64 = 120;
}

/// Knowledge filter limits
pub mod knowledge {
    /// Maximum number of relevant lines injected into the prompt
    pub const MAX_SNIPPET_LINES: usize = 3;
}

/// Session limits
pub mod sessions {
    pub const DEFAULT_MAX_SESSIONS: usize = 100;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;
    pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
}
