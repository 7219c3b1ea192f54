//! Offline feature-hashing embedder.
//!
//! Each lower-cased alphanumeric token is hashed with 64-bit FNV-1a into one
//! of `dimensions` buckets with a sign taken from the top hash bit, and the
//! resulting bag-of-words vector is L2-normalised. Texts sharing words land
//! close together, which is enough for keyword-flavoured retrieval without a
//! model download or an API key.

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vector::{Embedding, normalize};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A deterministic, never-failing [`EmbeddingProvider`].
///
/// # Example
///
/// ```rust,ignore
/// use docrag::HashingEmbeddingProvider;
///
/// let provider = HashingEmbeddingProvider::new(384)?;
/// let v = provider.embed("memory safety without a garbage collector").await?;
/// ```
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    /// Dimensionality used by [`Default`], matching common sentence encoders.
    pub const DEFAULT_DIMENSIONS: usize = 384;

    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `dimensions == 0`.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(RagError::InvalidConfiguration(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn embed_sync(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let hash = fnv1a(token);
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self { dimensions: Self::DEFAULT_DIMENSIONS }
    }
}

fn fnv1a(token: &str) -> u64 {
    token.chars().flat_map(char::to_lowercase).fold(FNV_OFFSET, |hash, c| {
        let mut buf = [0u8; 4];
        c.encode_utf8(&mut buf)
            .bytes()
            .fold(hash, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
    })
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.embed_sync(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|text| self.embed_sync(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::squared_l2;

    #[test]
    fn zero_dimensions_is_rejected() {
        assert!(matches!(HashingEmbeddingProvider::new(0), Err(RagError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn deterministic_and_case_insensitive() {
        let provider = HashingEmbeddingProvider::new(64).unwrap();
        let a = provider.embed("Rust Ownership").await.unwrap();
        let b = provider.embed("rust ownership").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn shared_words_are_closer() {
        let provider = HashingEmbeddingProvider::default();
        let query = provider.embed("borrow checker rules").await.unwrap();
        let near = provider.embed("the borrow checker enforces rules").await.unwrap();
        let far = provider.embed("pandas dataframes in python").await.unwrap();
        assert!(squared_l2(&query, &near) < squared_l2(&query, &far));
    }
}
