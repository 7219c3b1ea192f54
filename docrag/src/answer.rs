//! Question answering on top of a [`Retriever`].
//!
//! [`AnswerPipeline`] retrieves context for a question from the retriever's
//! current snapshot and hands it to a [`Generator`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::config::AnswerOptions;
use crate::document::RetrievalResult;
use crate::error::{RagError, Result};
use crate::generator::{GenerationRequest, Generator};
use crate::retriever::Retriever;

/// A generated answer together with the chunks it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: RetrievalResult,
}

/// Retrieve → generate.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = AnswerPipeline::new(retriever, Arc::new(generator), AnswerOptions::default())?;
/// let answer = pipeline.ask("Who wrote the book?").await?;
/// println!("{}\n\n{}", answer.text, answer.sources.render_markdown());
/// ```
pub struct AnswerPipeline {
    retriever: Arc<Retriever>,
    generator: Arc<dyn Generator>,
    options: AnswerOptions,
}

impl AnswerPipeline {
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `options` are invalid.
    pub fn new(
        retriever: Arc<Retriever>,
        generator: Arc<dyn Generator>,
        options: AnswerOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self { retriever, generator, options })
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    pub fn options(&self) -> &AnswerOptions {
        &self.options
    }

    /// Answer a question from the current snapshot.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidConfiguration`] for a blank question.
    /// - Any retrieval error from [`Retriever::query`].
    /// - [`RagError::GenerationError`] if the generator fails.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidConfiguration("question must not be blank".into()));
        }

        let sources = self.retriever.query(question, self.options.top_k).await?;

        let request = GenerationRequest::new(question, sources.texts())
            .with_system_prompt(self.options.system_prompt.clone())
            .with_max_tokens(self.options.max_tokens);

        let text = self.generator.generate(&request).await.inspect_err(|e| {
            error!(generation = sources.generation, error = %e, "answer generation failed");
        })?;

        info!(
            context_chunks = sources.len(),
            generation = sources.generation,
            answer_len = text.len(),
            "answered question"
        );
        Ok(Answer { text, sources })
    }
}
