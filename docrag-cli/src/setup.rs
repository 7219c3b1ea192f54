//! Wiring of embedder, generator and retriever from command-line options.

use std::sync::Arc;

use anyhow::{Context, Result};
use docrag::{
    DocumentSource, EmbeddingProvider, FileSource, Generator, HashingEmbeddingProvider, Retriever,
    RetrieverConfig,
};
use tracing::info;

use crate::cli::{AskArgs, EmbedderKind, GeneratorKind, IndexArgs};

/// Load the file named in `args`, build a retriever and ingest the file.
pub async fn ingest(args: &IndexArgs, top_k: usize) -> Result<Retriever> {
    let config = RetrieverConfig::builder()
        .chunk_size(args.chunk_size)
        .chunk_overlap(args.chunk_overlap)
        .top_k(top_k)
        .build()
        .context("invalid retrieval settings")?;

    let retriever = Retriever::new(config, embedder(args)?)?;

    let path = args.file.to_string_lossy();
    let document = FileSource::new().load(&path).await?;
    let summary = retriever
        .ingest(&document)
        .await
        .with_context(|| format!("failed to index '{}'", args.file.display()))?;

    info!(generation = summary.generation, "index ready");
    println!(
        "Indexed '{}': {} chunks, {} dimensions.",
        summary.document_id, summary.chunk_count, summary.dimensions
    );
    Ok(retriever)
}

fn embedder(args: &IndexArgs) -> Result<Arc<dyn EmbeddingProvider>> {
    match args.embedder {
        EmbedderKind::Hashing => {
            let dimensions =
                args.dimensions.unwrap_or(HashingEmbeddingProvider::DEFAULT_DIMENSIONS);
            Ok(Arc::new(HashingEmbeddingProvider::new(dimensions)?))
        }
        EmbedderKind::Openai => openai_embedder(args),
    }
}

#[cfg(feature = "openai")]
fn openai_embedder(args: &IndexArgs) -> Result<Arc<dyn EmbeddingProvider>> {
    let mut provider = docrag::openai::OpenAIEmbeddingProvider::from_env()?;
    if let Some(model) = &args.embedding_model {
        provider = provider.with_model(model.clone());
    }
    if let Some(dimensions) = args.dimensions {
        provider = provider.with_dimensions(dimensions);
    }
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "openai"))]
fn openai_embedder(_args: &IndexArgs) -> Result<Arc<dyn EmbeddingProvider>> {
    anyhow::bail!("this build of docrag was compiled without the `openai` feature")
}

/// The configured answer generator, or `None` to print retrieved context.
pub fn generator(args: &AskArgs) -> Result<Option<Arc<dyn Generator>>> {
    match args.generator {
        GeneratorKind::None => Ok(None),
        GeneratorKind::Huggingface => huggingface_generator(args).map(Some),
    }
}

#[cfg(feature = "huggingface")]
fn huggingface_generator(args: &AskArgs) -> Result<Arc<dyn Generator>> {
    let mut generator = docrag::huggingface::HuggingFaceGenerator::from_env()?;
    if let Some(model) = &args.model {
        generator = generator.with_model(model.clone());
    }
    Ok(Arc::new(generator))
}

#[cfg(not(feature = "huggingface"))]
fn huggingface_generator(_args: &AskArgs) -> Result<Arc<dyn Generator>> {
    anyhow::bail!("this build of docrag was compiled without the `huggingface` feature")
}
