//! Knowledge Base Loader
//!
//! Loads `.txt` and `.md` files from a directory into the startup corpus that
//! new sessions begin with.

use std::path::Path;

use crate::knowledge::{DocumentKind, KnowledgeBase, UploadedDocument};
use crate::RagError;

/// Loader for directory-backed corpora
pub struct KnowledgeLoader;

impl KnowledgeLoader {
    /// Load every text document in `knowledge_dir`, in file-name order.
    ///
    /// A missing directory yields an empty corpus.
    pub fn load_directory(knowledge_dir: &Path) -> Result<KnowledgeBase, RagError> {
        if !knowledge_dir.exists() {
            tracing::warn!(
                path = %knowledge_dir.display(),
                "Knowledge directory does not exist"
            );
            return Ok(KnowledgeBase::empty());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(knowledge_dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            if DocumentKind::detect(&name, None) != DocumentKind::Text {
                continue;
            }

            match std::fs::read_to_string(&path) {
                Ok(content) => documents.push(UploadedDocument::new(name, None, content)),
                Err(e) => {
                    tracing::error!(
                        file = %path.display(),
                        error = %e,
                        "Failed to read knowledge file"
                    );
                }
            }
        }

        let (base, report) = KnowledgeBase::from_documents(&documents);

        tracing::info!(
            directory = %knowledge_dir.display(),
            documents = report.accepted.len(),
            bytes = base.len_bytes(),
            "Knowledge base loading complete"
        );

        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_billing.md"), "contact support for billing").unwrap();
        std::fs::write(dir.path().join("a_faq.txt"), "reset your password here").unwrap();
        std::fs::write(dir.path().join("c_data.json"), "{\"ignored\": true}").unwrap();

        let base = KnowledgeLoader::load_directory(dir.path()).unwrap();

        assert_eq!(
            base.corpus(),
            "reset your password here\n\ncontact support for billing\n\n"
        );
        assert_eq!(base.sources().len(), 2);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let base = KnowledgeLoader::load_directory(&dir.path().join("absent")).unwrap();
        assert!(base.is_empty());
    }
}
