//! Answer generator trait and prompt assembly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default system prompt: answer only from the supplied context.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant answering a question based \
     on a provided document. Use the following pieces of context to answer the user's question. \
     If the answer is not contained within the context, simply state 'I don't know based on the \
     provided document.'";

/// Separator placed between retrieved chunks in the user prompt.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Everything a generator needs to produce one answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub query: String,
    /// Retrieved chunk texts, closest first.
    pub context: Vec<String>,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// A request with the default system prompt and a 500 token limit.
    pub fn new(query: impl Into<String>, context: Vec<String>) -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            query: query.into(),
            context,
            max_tokens: 500,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The user turn: context blocks followed by the question.
    pub fn user_prompt(&self) -> String {
        format!("Context:\n{}\n\nQuestion: {}", self.context.join(CONTEXT_SEPARATOR), self.query)
    }
}

/// A backend that turns a question plus retrieved context into an answer.
///
/// Failures are reported as
/// [`RagError::GenerationError`](crate::RagError::GenerationError); an
/// implementation must never return an error description as answer text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_joins_context_with_separator() {
        let context = vec!["Rust is fast.".to_string(), "It is safe.".to_string()];
        let request = GenerationRequest::new("What is Rust?", context);
        assert_eq!(
            request.user_prompt(),
            "Context:\nRust is fast.\n\n---\n\nIt is safe.\n\nQuestion: What is Rust?"
        );
    }

    #[test]
    fn defaults_use_reference_prompt() {
        let request = GenerationRequest::new("q", Vec::new());
        assert_eq!(request.max_tokens, 500);
        assert!(request.system_prompt.contains("I don't know based on the provided document."));
    }
}
