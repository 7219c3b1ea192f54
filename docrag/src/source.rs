//! Document sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error};

use crate::document::Document;
use crate::error::{RagError, Result};

/// Supplies raw document text for an identifier.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Load the document named by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DocumentUnreadable`] if the text cannot be read.
    async fn load(&self, id: &str) -> Result<Document>;
}

/// Reads UTF-8 text files, resolving ids relative to an optional root.
///
/// The document id is the file name, `source_uri` is the resolved path, and
/// the `path` metadata entry records the same path.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    /// A source resolving ids as paths relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source resolving relative ids against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn load(&self, id: &str) -> Result<Document> {
        let path = self.resolve(id);
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to read document");
            RagError::DocumentUnreadable { source_id: id.to_string(), message: e.to_string() }
        })?;
        debug!(path = %path.display(), bytes = text.len(), "loaded document");

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.to_string());
        let uri = path.display().to_string();
        let mut document = Document::new(name, text).with_source_uri(uri.clone());
        document.metadata.insert("path".to_string(), uri);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let err = FileSource::new().load("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(err, RagError::DocumentUnreadable { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn loads_text_relative_to_root() {
        let dir = std::env::temp_dir().join(format!("docrag-source-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("notes.txt"), "ownership and borrowing").await.unwrap();

        let document = FileSource::with_root(&dir).load("notes.txt").await.unwrap();
        assert_eq!(document.id, "notes.txt");
        assert_eq!(document.text, "ownership and borrowing");
        assert!(document.metadata.contains_key("path"));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
