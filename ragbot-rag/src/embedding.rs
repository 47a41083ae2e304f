//! Embedding provider trait for turning text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A fixed-length vector produced by an [`EmbeddingProvider`].
pub type Embedding = Vec<f32>;

/// A provider that generates vector embeddings from text input.
///
/// Implementations must return exactly one vector per input, in input order,
/// and every vector from one provider must share the same dimensionality.
/// The store and pipeline verify both and report violations as
/// [`RagError::EmbeddingError`](crate::RagError::EmbeddingError).
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) calls
/// [`embed`](EmbeddingProvider::embed) sequentially; backends with a native
/// batch endpoint should override it.
///
/// # Example
///
/// ```rust,ignore
/// use ragbot_rag::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let embedding = provider.embed("hello world").await?;
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// A short name used in error messages and logs.
    fn name(&self) -> &str {
        "custom"
    }
}
