//! The seam between the retriever and whatever turns text into vectors.

use async_trait::async_trait;

use crate::error::Result;
use crate::vector::Embedding;

/// Maps text to fixed-length vectors.
///
/// Contract relied on by [`Retriever`](crate::Retriever):
///
/// - every vector has exactly [`dimensions`](Self::dimensions) entries
///   (checked at ingestion, a violation is a
///   [`DimensionMismatch`](crate::RagError::DimensionMismatch));
/// - the same text always maps to the same vector;
/// - [`embed_batch`](Self::embed_batch) returns one vector per input, in
///   input order.
///
/// A backend that cannot be reached reports
/// [`RagError::EmbeddingError`](crate::RagError::EmbeddingError).
///
/// ```rust,ignore
/// let v = provider.embed("what does the borrow checker do?").await?;
/// assert_eq!(v.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text; used for queries.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed several texts; used for chunks during ingestion.
    ///
    /// Falls back to one [`embed`](Self::embed) call per text, stopping at
    /// the first failure.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for &text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// Backend name used in errors and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;

    /// Embeds a text as `[chars, words]` and refuses the word "fail".
    struct Counting;

    #[async_trait]
    impl EmbeddingProvider for Counting {
        async fn embed(&self, text: &str) -> Result<Embedding> {
            if text == "fail" {
                return Err(RagError::EmbeddingError {
                    provider: "counting".into(),
                    message: "refused".into(),
                });
            }
            Ok(vec![text.chars().count() as f32, text.split_whitespace().count() as f32])
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn default_batch_keeps_input_order() {
        let vectors = Counting.embed_batch(&["a b c", "", "hello"]).await.unwrap();
        assert_eq!(vectors, vec![vec![5.0, 3.0], vec![0.0, 0.0], vec![5.0, 1.0]]);
    }

    #[tokio::test]
    async fn default_batch_stops_at_first_failure() {
        let err = Counting.embed_batch(&["ok", "fail", "never"]).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
        assert_eq!(Counting.name(), "counting");
    }
}
