//! Core traits for the avatar assistant
//!
//! Every external provider sits behind one of these traits so the turn
//! pipeline can be driven by real HTTP backends or by test doubles.
//!
//! ```text
//! Language Models:
//!   - LanguageModel: chat completion
//!
//! Media:
//!   - TextToSpeech: text → audio file
//!   - AvatarRenderer: text + audio + image → video URL
//! ```

mod avatar;
mod llm;
mod speech;

pub use avatar::AvatarRenderer;
pub use llm::LanguageModel;
pub use speech::TextToSpeech;
