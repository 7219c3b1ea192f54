//! # docrag
//!
//! Retrieval core for question answering over a single document.
//!
//! A document is split into overlapping fixed-size windows, each window is
//! embedded into a fixed-dimension vector, and the vectors are kept in an
//! exact nearest-neighbor index. Queries are embedded the same way and
//! answered with the closest chunks, which an optional [`Generator`] turns
//! into an answer.
//!
//! ## Components
//!
//! - [`chunking`]: overlapping windows with coverage and termination guarantees
//! - [`index`]: [`FlatIndex`], exact k-NN over squared Euclidean distance
//! - [`retriever`]: [`Retriever`], ingestion and queries over an atomically
//!   swapped snapshot
//! - [`embedding`] / [`generator`] / [`source`]: seams for external
//!   collaborators, with [`HashingEmbeddingProvider`] and [`FileSource`]
//!   built in
//! - [`answer`]: [`AnswerPipeline`], retrieve then generate
//!
//! ## Features
//!
//! - `openai`: [`openai::OpenAIEmbeddingProvider`]
//! - `huggingface`: [`huggingface::HuggingFaceGenerator`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docrag::{Document, HashingEmbeddingProvider, Retriever, RetrieverConfig};
//!
//! let retriever = Retriever::new(
//!     RetrieverConfig::builder().chunk_size(500).chunk_overlap(50).build()?,
//!     Arc::new(HashingEmbeddingProvider::default()),
//! )?;
//! retriever.ingest(&Document::new("guide.txt", text)).await?;
//! for hit in retriever.query("how do lifetimes work?", 3).await?.hits {
//!     println!("{:.3} {}", hit.distance, hit.chunk.text);
//! }
//! ```

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
pub mod hashing;
pub mod index;
pub mod retriever;
pub mod source;
pub mod vector;

#[cfg(any(feature = "openai", feature = "huggingface"))]
mod http;

#[cfg(feature = "huggingface")]
pub mod huggingface;
#[cfg(feature = "openai")]
pub mod openai;

pub use answer::{Answer, AnswerPipeline};
pub use chunking::{ChunkIter, ChunkParams, Chunker, FixedSizeChunker, Window, chunk};
pub use config::{AnswerOptions, RetrieverConfig, RetrieverConfigBuilder};
pub use document::{Chunk, Document, RetrievalResult, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result, Stage};
pub use generator::{CONTEXT_SEPARATOR, DEFAULT_SYSTEM_PROMPT, GenerationRequest, Generator};
pub use hashing::HashingEmbeddingProvider;
pub use index::{FlatIndex, Neighbor, VectorRecord};
pub use retriever::{IngestSummary, Retriever, RetrieverBuilder, RetrieverState, Snapshot};
pub use source::{DocumentSource, FileSource};
pub use vector::{Embedding, squared_l2};
