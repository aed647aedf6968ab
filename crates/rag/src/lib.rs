//! Knowledge retrieval for the avatar assistant
//!
//! Features:
//! - Keyword line filter over a plain-text corpus
//! - Corpus building from uploaded documents (text and Markdown)
//! - Startup corpus loading from a directory

pub mod filter;
pub mod knowledge;
pub mod knowledge_loader;

pub use filter::search_knowledge_base;
pub use knowledge::{DocumentKind, IngestReport, KnowledgeBase, SkippedDocument, UploadedDocument};
pub use knowledge_loader::KnowledgeLoader;

use thiserror::Error;

/// Knowledge errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Text extraction not supported for {0}")]
    ExtractionUnsupported(String),

    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Io(err.to_string())
    }
}

impl From<RagError> for avatar_assistant_core::Error {
    fn from(err: RagError) -> Self {
        avatar_assistant_core::Error::Knowledge(err.to_string())
    }
}
