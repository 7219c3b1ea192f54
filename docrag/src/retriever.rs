//! Retrieval orchestrator.
//!
//! The [`Retriever`] owns the current [`Snapshot`] (chunks plus the index
//! built from their embeddings) and coordinates ingestion
//! (chunk → embed → build → swap) and queries (embed → search → resolve).
//!
//! The snapshot pointer is the only shared mutable state. Ingestion builds a
//! complete snapshot off to the side and swaps it in under a short write
//! lock; queries clone the `Arc` under a read lock and work on that snapshot
//! until they finish. A query therefore sees exactly one snapshot, old or new.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docrag::{Document, HashingEmbeddingProvider, Retriever, RetrieverConfig};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrieverConfig::default())
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .build()?;
//!
//! retriever.ingest(&Document::new("book.txt", text)).await?;
//! let result = retriever.query("what is ownership?", 3).await?;
//! ```

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RetrieverConfig;
use crate::document::{Chunk, Document, RetrievalResult, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result, Stage};
use crate::index::{FlatIndex, VectorRecord};
use crate::vector::{Embedding, check_dimensions};

/// Whether a document has been ingested yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverState {
    /// No successful ingestion so far; queries fail with [`RagError::NotReady`].
    Empty,
    /// A snapshot is available for queries.
    Ready,
}

/// The immutable result of one ingestion.
#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    document_id: String,
    chunks: Vec<Chunk>,
    index: FlatIndex,
}

impl Snapshot {
    /// Monotonic counter, 1 for the first successful ingestion.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Chunks in index record order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }
}

/// What an ingestion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub document_id: String,
    pub generation: u64,
    pub chunk_count: usize,
    pub dimensions: usize,
}

/// Chunks, embeds, and indexes one document at a time and answers queries
/// against the most recent complete snapshot.
///
/// Construct one via [`Retriever::builder()`]. Share it behind an `Arc`;
/// every method takes `&self`.
pub struct Retriever {
    config: RetrieverConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    current: RwLock<Option<Arc<Snapshot>>>,
    ingest_gate: Mutex<()>,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Shorthand for a builder with a config and an embedder.
    pub fn new(
        config: RetrieverConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        Self::builder().config(config).embedding_provider(embedding_provider).build()
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// The snapshot queries currently run against, if any.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    pub async fn state(&self) -> RetrieverState {
        if self.current.read().await.is_some() {
            RetrieverState::Ready
        } else {
            RetrieverState::Empty
        }
    }

    /// Ingest a document: chunk → embed → build index → swap snapshot.
    ///
    /// Concurrent calls are serialized. On any failure the previous snapshot
    /// (or the empty state) stays in place.
    ///
    /// # Errors
    ///
    /// - [`RagError::ChunkingError`] if the document is blank or yields no chunks.
    /// - [`RagError::EmbeddingError`] if the embedder fails on any chunk.
    /// - [`RagError::DimensionMismatch`] if a vector's length differs from
    ///   the embedder's declared dimensionality.
    pub async fn ingest(&self, document: &Document) -> Result<IngestSummary> {
        let _gate = self.ingest_gate.lock().await;

        // 1. Chunk
        if document.is_blank() {
            error!(document.id = %document.id, "document contains no text");
            return Err(RagError::ChunkingError(format!(
                "document '{}' contains no text",
                document.id
            )));
        }
        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            error!(document.id = %document.id, "chunker produced no chunks");
            return Err(RagError::ChunkingError(format!(
                "document '{}' produced no chunks",
                document.id
            )));
        }

        // 2. Embed
        let vectors = self.embed_chunks(&chunks).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
        })?;

        // 3. Build
        let dimensions = self.embedding_provider.dimensions();
        let mut records = Vec::with_capacity(vectors.len());
        for (chunk, vector) in chunks.iter().zip(vectors) {
            check_dimensions(dimensions, &vector, Stage::Indexing).inspect_err(|e| {
                error!(document.id = %document.id, error = %e, "wrong embedding size");
            })?;
            records.push(VectorRecord { sequence_index: chunk.sequence_index, vector });
        }
        let index = FlatIndex::from_records(records)?;

        // 4. Swap
        let mut current = self.current.write().await;
        let generation = current.as_ref().map_or(1, |s| s.generation + 1);
        let snapshot =
            Arc::new(Snapshot { generation, document_id: document.id.clone(), chunks, index });
        let summary = IngestSummary {
            document_id: document.id.clone(),
            generation,
            chunk_count: snapshot.chunks.len(),
            dimensions,
        };
        *current = Some(snapshot);
        drop(current);

        info!(
            document.id = %document.id,
            chunk_count = summary.chunk_count,
            generation,
            "ingested document"
        );
        Ok(summary)
    }

    /// Query the current snapshot for the `k` chunks closest to `text`.
    ///
    /// # Errors
    ///
    /// - [`RagError::NotReady`] if nothing has been ingested.
    /// - [`RagError::InvalidConfiguration`] if `k == 0`.
    /// - [`RagError::EmbeddingError`] if the query cannot be embedded.
    /// - [`RagError::DimensionMismatch`] (search stage) if the query vector has
    ///   the wrong length.
    pub async fn query(&self, text: &str, k: usize) -> Result<RetrievalResult> {
        let snapshot = self.snapshot().await.ok_or(RagError::NotReady)?;
        if k == 0 {
            return Err(RagError::InvalidConfiguration("k must be greater than zero".into()));
        }

        let query_embedding = self.embedding_provider.embed(text).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during query");
        })?;

        let neighbors = snapshot.index.search(&query_embedding, k).inspect_err(|e| {
            error!(generation = snapshot.generation, error = %e, "index search failed");
        })?;

        // Records were built in chunk order, so record_index addresses `chunks`.
        let hits: Vec<ScoredChunk> = neighbors
            .into_iter()
            .map(|n| ScoredChunk {
                chunk: snapshot.chunks[n.record_index].clone(),
                distance: n.distance,
            })
            .collect();

        info!(result_count = hits.len(), generation = snapshot.generation, "query completed");

        Ok(RetrievalResult {
            document_id: snapshot.document_id.clone(),
            generation: snapshot.generation,
            hits,
        })
    }

    /// [`query`](Retriever::query) with the configured `top_k`.
    pub async fn retrieve(&self, text: &str) -> Result<RetrievalResult> {
        self.query(text, self.config.top_k).await
    }

    /// Embed chunk texts in batches, keeping up to `embedding_concurrency`
    /// batches in flight. Output order matches `chunks`.
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let provider = self.embedding_provider.as_ref();
        let batch_size = self.config.embedding_batch_size;

        // Batches are addressed by start offset so the mapping closure takes
        // no borrowed argument and the ingest future stays `Send`.
        let batches: Vec<Vec<Embedding>> = stream::iter((0..texts.len()).step_by(batch_size))
            .map(|start| {
                let end = (start + batch_size).min(texts.len());
                embed_batch_checked(provider, &texts[start..end])
            })
            .buffered(self.config.embedding_concurrency)
            .try_collect()
            .await?;

        Ok(batches.into_iter().flatten().collect())
    }
}

/// One `embed_batch` call, rejecting a reply with the wrong number of vectors.
async fn embed_batch_checked(
    provider: &dyn EmbeddingProvider,
    batch: &[&str],
) -> Result<Vec<Embedding>> {
    debug!(provider = provider.name(), batch_size = batch.len(), "embedding batch");
    let vectors = provider.embed_batch(batch).await?;
    if vectors.len() != batch.len() {
        return Err(RagError::EmbeddingError {
            provider: provider.name().to_string(),
            message: format!("returned {} embeddings for {} inputs", vectors.len(), batch.len()),
        });
    }
    Ok(vectors)
}

/// Builder for constructing a [`Retriever`].
///
/// `embedding_provider` is required. `config` defaults to
/// [`RetrieverConfig::default()`]; `chunker` defaults to a
/// [`FixedSizeChunker`] using the config's chunk size and overlap.
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RetrieverConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RetrieverBuilder {
    pub fn config(mut self, config: RetrieverConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Replace the default fixed-size chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`Retriever`] in the [`RetrieverState::Empty`] state.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if the config is invalid or
    /// no embedding provider was set.
    pub fn build(self) -> Result<Retriever> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RagError::InvalidConfiguration("embedding_provider is required".to_string())
        })?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::from_params(config.chunk_params()?)),
        };

        Ok(Retriever {
            config,
            embedding_provider,
            chunker,
            current: RwLock::new(None),
            ingest_gate: Mutex::new(()),
        })
    }
}
