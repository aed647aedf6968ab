//! Knowledge corpus built from uploaded documents

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::filter::search_knowledge_base;
use crate::RagError;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A document handed to the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    /// File name, used for type detection when the content type is missing
    pub name: String,
    /// MIME type reported by the uploader
    #[serde(default)]
    pub content_type: Option<String>,
    /// Document text
    pub content: String,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, content_type: Option<&str>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(str::to_string),
            content: content.into(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::detect(&self.name, self.content_type.as_deref())
    }
}

/// How a document is treated during ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Plain text or Markdown, appended verbatim
    Text,
    Pdf,
    Docx,
    Unsupported,
}

impl DocumentKind {
    /// Classify by MIME type, falling back to the file extension
    pub fn detect(name: &str, content_type: Option<&str>) -> Self {
        let by_mime = content_type.map(|mime| {
            let mime = mime.split(';').next().unwrap_or("").trim().to_lowercase();
            match mime.as_str() {
                "text/plain" | "text/markdown" => Self::Text,
                "application/pdf" => Self::Pdf,
                DOCX_MIME => Self::Docx,
                _ => Self::Unsupported,
            }
        });

        match by_mime {
            Some(kind) if kind != Self::Unsupported => kind,
            _ => Self::from_extension(name),
        }
    }

    fn from_extension(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "txt" | "md" | "markdown" => Self::Text,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Unsupported,
        }
    }
}

/// A document left out of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: String,
}

/// Outcome of building a corpus
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Names of the documents appended, in upload order
    pub accepted: Vec<String>,
    pub skipped: Vec<SkippedDocument>,
}

/// Plain-text knowledge corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    corpus: String,
    sources: Vec<String>,
}

impl KnowledgeBase {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a corpus from documents. Each text document is appended followed
    /// by a blank line; everything else is reported as skipped.
    pub fn from_documents(documents: &[UploadedDocument]) -> (Self, IngestReport) {
        let mut base = Self::default();
        let mut report = IngestReport::default();

        for doc in documents {
            let rejection = match doc.kind() {
                DocumentKind::Text => None,
                DocumentKind::Pdf | DocumentKind::Docx => {
                    Some(RagError::ExtractionUnsupported(doc.name.clone()))
                }
                DocumentKind::Unsupported => Some(RagError::UnsupportedType(
                    doc.content_type.clone().unwrap_or_else(|| doc.name.clone()),
                )),
            };

            match rejection {
                None => {
                    base.corpus.push_str(&doc.content);
                    base.corpus.push_str("\n\n");
                    base.sources.push(doc.name.clone());
                    report.accepted.push(doc.name.clone());
                }
                Some(e) => {
                    tracing::info!(document = %doc.name, reason = %e, "Skipping knowledge document");
                    report.skipped.push(SkippedDocument {
                        name: doc.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (base, report)
    }

    /// Relevance snippet for a query
    pub fn search(&self, query: &str) -> String {
        search_knowledge_base(query, &self.corpus)
    }

    pub fn corpus(&self) -> &str {
        &self.corpus
    }

    /// Names of the documents the corpus was built from
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn len_bytes(&self) -> usize {
        self.corpus.len()
    }
}
