//! Text-to-Speech
//!
//! Hosted synthesis only. Each call produces one complete audio file.

mod elevenlabs;
mod retention;

pub use elevenlabs::{ElevenLabsConfig, ElevenLabsTts};
pub use retention::sweep_expired_audio;
