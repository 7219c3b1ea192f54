//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "docrag", version, about = "Ask questions about a text document")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a document and answer questions about it interactively
    Ask(AskArgs),
    /// Ingest a document and print the chunks closest to one query
    Search(SearchArgs),
}

/// Options shared by every command that builds an index.
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Path to a UTF-8 text file
    pub file: PathBuf,

    /// Chunk size in characters
    #[arg(long, env = "DOCRAG_CHUNK_SIZE", default_value_t = 500)]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(long, env = "DOCRAG_CHUNK_OVERLAP", default_value_t = 50)]
    pub chunk_overlap: usize,

    /// Embedding backend
    #[arg(long, value_enum, env = "DOCRAG_EMBEDDER", default_value_t = EmbedderKind::Hashing)]
    pub embedder: EmbedderKind,

    /// Embedding dimensionality (defaults to 384 for hashing, the model default otherwise)
    #[arg(long)]
    pub dimensions: Option<usize>,

    /// Embedding model name for remote embedders
    #[arg(long, env = "DOCRAG_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// Number of chunks handed to the generator as context
    #[arg(short = 'k', long, env = "DOCRAG_TOP_K", default_value_t = 3)]
    pub top_k: usize,

    /// Upper bound on generated tokens
    #[arg(long, default_value_t = 500)]
    pub max_tokens: u32,

    /// Replace the default system prompt
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// Answer generator; `none` prints the retrieved context instead
    #[arg(long, value_enum, env = "DOCRAG_GENERATOR", default_value_t = GeneratorKind::None)]
    pub generator: GeneratorKind,

    /// Generator model name
    #[arg(long, env = "DOCRAG_MODEL")]
    pub model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// The query text
    pub query: String,

    /// Number of chunks to return
    #[arg(short = 'k', long, env = "DOCRAG_TOP_K", default_value_t = 3)]
    pub top_k: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    /// Offline feature hashing
    Hashing,
    /// OpenAI-compatible embeddings API (OPENAI_API_KEY)
    Openai,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    None,
    /// Hugging Face inference router (HF_TOKEN)
    Huggingface,
}
