//! Configuration for the retriever and answer pipeline.

use serde::{Deserialize, Serialize};

use crate::chunking::ChunkParams;
use crate::error::{RagError, Result};
use crate::generator::DEFAULT_SYSTEM_PROMPT;

/// Configuration parameters for the [`Retriever`](crate::Retriever).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of results returned by [`Retriever::retrieve`](crate::Retriever::retrieve).
    pub top_k: usize,
    /// Number of chunk texts sent to the embedder per `embed_batch` call.
    pub embedding_batch_size: usize,
    /// Maximum number of embedding batches in flight during ingestion.
    pub embedding_concurrency: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            embedding_batch_size: 32,
            embedding_concurrency: 4,
        }
    }
}

impl RetrieverConfig {
    /// Create a new builder for constructing a [`RetrieverConfig`].
    pub fn builder() -> RetrieverConfigBuilder {
        RetrieverConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if:
    /// - `chunk_size == 0` or `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `embedding_batch_size == 0` or `embedding_concurrency == 0`
    pub fn validate(&self) -> Result<()> {
        self.chunk_params()?;
        if self.top_k == 0 {
            return Err(RagError::InvalidConfiguration("top_k must be greater than zero".into()));
        }
        if self.embedding_batch_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "embedding_batch_size must be greater than zero".into(),
            ));
        }
        if self.embedding_concurrency == 0 {
            return Err(RagError::InvalidConfiguration(
                "embedding_concurrency must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// The validated chunking parameters.
    pub fn chunk_params(&self) -> Result<ChunkParams> {
        ChunkParams::new(self.chunk_size, self.chunk_overlap)
    }
}

/// Builder for constructing a validated [`RetrieverConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrieverConfigBuilder {
    config: RetrieverConfig,
}

impl RetrieverConfigBuilder {
    /// Set the chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of results.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    pub fn embedding_batch_size(mut self, size: usize) -> Self {
        self.config.embedding_batch_size = size;
        self
    }

    pub fn embedding_concurrency(mut self, concurrency: usize) -> Self {
        self.config.embedding_concurrency = concurrency;
        self
    }

    /// Build the [`RetrieverConfig`], validating it.
    ///
    /// # Errors
    ///
    /// See [`RetrieverConfig::validate`].
    pub fn build(self) -> Result<RetrieverConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Options for [`AnswerPipeline`](crate::AnswerPipeline).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnswerOptions {
    /// Number of chunks retrieved as context.
    pub top_k: usize,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// System prompt handed to the generator.
    pub system_prompt: String,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self { top_k: 3, max_tokens: 500, system_prompt: DEFAULT_SYSTEM_PROMPT.to_string() }
    }
}

impl AnswerOptions {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `top_k` or `max_tokens` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RagError::InvalidConfiguration("top_k must be greater than zero".into()));
        }
        if self.max_tokens == 0 {
            return Err(RagError::InvalidConfiguration(
                "max_tokens must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
