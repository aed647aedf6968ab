//! Core traits and types for the avatar assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Core traits for pluggable backends (chat completion, speech, avatar video)
//! - Conversation turn types
//! - Language preference
//! - Media artifact types
//! - Error types

pub mod conversation;
pub mod error;
pub mod language;
pub mod llm_types;
pub mod media;
pub mod traits;

pub use conversation::{Turn, TurnRole};
pub use error::{Error, Result};
pub use language::LanguagePreference;
pub use llm_types::{FinishReason, GenerateRequest, GenerateResponse, Message, Role};
pub use media::{AvatarRequest, SpeechArtifact};

pub use traits::{AvatarRenderer, LanguageModel, TextToSpeech};
