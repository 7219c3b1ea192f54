//! Error types for the `docrag` crate.

use std::fmt;

use thiserror::Error;

/// Errors that can occur while ingesting, searching, or answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// Chunking or retrieval parameters are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A vector does not have the dimensionality the index expects.
    #[error("Dimension mismatch during {stage}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality fixed by the index (or the first vector).
        expected: usize,
        /// The dimensionality that was supplied.
        actual: usize,
        /// Where the mismatch was detected.
        stage: Stage,
    },

    /// An index was built from an empty sequence of vectors.
    #[error("Cannot build an index from zero vectors")]
    EmptyInput,

    /// The embedding provider failed or is unavailable.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A document could not be turned into chunks.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// A query arrived before any document was ingested.
    #[error("Retriever is not ready: no document has been ingested")]
    NotReady,

    /// The document source could not supply text.
    #[error("Document '{source_id}' is unreadable: {message}")]
    DocumentUnreadable {
        /// The identifier or path that was requested.
        source_id: String,
        /// A description of the failure.
        message: String,
    },

    /// The answer generator failed or is unavailable.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generator backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

/// The stage of the pipeline an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configuration,
    Source,
    Chunking,
    Embedding,
    Indexing,
    Search,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Source => "source",
            Stage::Chunking => "chunking",
            Stage::Embedding => "embedding",
            Stage::Indexing => "indexing",
            Stage::Search => "search",
            Stage::Generation => "generation",
        };
        f.write_str(name)
    }
}

impl RagError {
    /// Return the pipeline stage this error belongs to.
    ///
    /// `DimensionMismatch` reports the stage it was detected in: indexing
    /// for vectors entering an index, search for query vectors.
    pub fn stage(&self) -> Stage {
        match self {
            RagError::InvalidConfiguration(_) => Stage::Configuration,
            RagError::DimensionMismatch { stage, .. } => *stage,
            RagError::EmptyInput => Stage::Indexing,
            RagError::EmbeddingError { .. } => Stage::Embedding,
            RagError::ChunkingError(_) => Stage::Chunking,
            RagError::NotReady => Stage::Search,
            RagError::DocumentUnreadable { .. } => Stage::Source,
            RagError::GenerationError { .. } => Stage::Generation,
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Only failures of external collaborators are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RagError::EmbeddingError { .. }
                | RagError::GenerationError { .. }
                | RagError::DocumentUnreadable { .. }
        )
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_assigned_per_variant() {
        assert_eq!(RagError::NotReady.stage(), Stage::Search);
        assert_eq!(RagError::EmptyInput.stage(), Stage::Indexing);
        assert_eq!(
            RagError::EmbeddingError { provider: "x".into(), message: "down".into() }.stage(),
            Stage::Embedding
        );
        assert_eq!(RagError::ChunkingError("blank".into()).stage().to_string(), "chunking");
    }

    #[test]
    fn only_collaborator_failures_are_retryable() {
        assert!(
            RagError::GenerationError { provider: "hf".into(), message: "503".into() }
                .is_retryable()
        );
        let mismatch = RagError::DimensionMismatch { expected: 3, actual: 4, stage: Stage::Search };
        assert!(!mismatch.is_retryable());
        assert!(!RagError::InvalidConfiguration("overlap".into()).is_retryable());
    }
}
