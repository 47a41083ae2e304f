//! In-memory embedding store.
//!
//! [`EmbeddingStore`] holds two parallel sequences, chunks and their
//! embeddings, that always have the same length and whose embeddings all
//! share one dimensionality. Writes are all-or-nothing: embeddings for a whole
//! batch are computed and validated before anything is committed, so a failed
//! batch leaves the previous contents untouched.
//!
//! The store itself is plain data. [`RagPipeline`](crate::RagPipeline) wraps
//! it in a `tokio::sync::RwLock` so reads may run concurrently while writes
//! are serialized.

use tracing::{debug, info};

use crate::config::IngestMode;
use crate::document::Chunk;
use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::{RagError, Result};

/// Parallel chunk/embedding arrays kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingStore {
    chunks: Vec<Chunk>,
    embeddings: Vec<Embedding>,
}

impl EmbeddingStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from chunks whose embeddings are already known.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the two sequences differ in
    /// length or the embeddings differ in dimensionality.
    pub fn from_embedded(chunks: Vec<Chunk>, embeddings: Vec<Embedding>) -> Result<Self> {
        check_batch("precomputed", chunks.len(), &embeddings, None)?;
        Ok(Self { chunks, embeddings })
    }

    /// Embed `chunks` in one batch call and replace the store's contents.
    ///
    /// Returns the number of chunks now stored.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the provider fails or returns a
    /// malformed batch. The store is unchanged in that case.
    pub async fn ingest(
        &mut self,
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<usize> {
        self.ingest_with_mode(chunks, provider, IngestMode::Replace).await
    }

    /// Embed `chunks` in one batch call and add them after the existing ones.
    ///
    /// Returns the number of chunks added.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the provider fails, returns a
    /// malformed batch, or returns vectors whose dimensionality differs from
    /// what is already stored. The store is unchanged in that case.
    pub async fn append(
        &mut self,
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<usize> {
        self.ingest_with_mode(chunks, provider, IngestMode::Append).await
    }

    /// Embed `chunks` and commit them according to `mode`.
    ///
    /// Returns the number of chunks in the committed batch.
    pub async fn ingest_with_mode(
        &mut self,
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
        mode: IngestMode,
    ) -> Result<usize> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            provider.embed_batch(&texts).await.map_err(|e| match e {
                RagError::EmbeddingError { .. } => e,
                other => RagError::embedding(provider.name(), other.to_string()),
            })?
        };

        let existing = match mode {
            IngestMode::Replace => None,
            IngestMode::Append => self.dimensions(),
        };
        check_batch(provider.name(), chunks.len(), &embeddings, existing)?;

        let batch_len = chunks.len();
        match mode {
            IngestMode::Replace => {
                self.chunks = chunks;
                self.embeddings = embeddings;
            }
            IngestMode::Append => {
                self.chunks.extend(chunks);
                self.embeddings.extend(embeddings);
            }
        }
        info!(?mode, batch_len, stored = self.chunks.len(), "committed embedding batch");
        Ok(batch_len)
    }

    /// Number of stored chunks.
    pub fn count(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the store holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Dimensionality of the stored embeddings, or `None` when empty.
    pub fn dimensions(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }

    /// Remove every chunk and embedding. Idempotent.
    pub fn clear(&mut self) {
        let removed = self.chunks.len();
        self.chunks.clear();
        self.embeddings.clear();
        debug!(removed, "cleared embedding store");
    }

    /// Stored chunks in insertion order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Iterate `(chunk, embedding)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&Chunk, &Embedding)> {
        self.chunks.iter().zip(self.embeddings.iter())
    }
}

/// Validate one batch of embeddings against its chunk count and, when
/// appending, against the dimensionality already stored.
fn check_batch(
    provider: &str,
    expected: usize,
    embeddings: &[Embedding],
    existing_dimensions: Option<usize>,
) -> Result<()> {
    if embeddings.len() != expected {
        return Err(RagError::embedding(
            provider,
            format!("expected {expected} embeddings, got {}", embeddings.len()),
        ));
    }
    let Some(first) = embeddings.first() else {
        return Ok(());
    };
    let dimensions = existing_dimensions.unwrap_or(first.len());
    if dimensions == 0 {
        return Err(RagError::embedding(provider, "embeddings must not be empty"));
    }
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
        return Err(RagError::embedding(
            provider,
            format!("inconsistent dimensionality: expected {dimensions}, got {}", bad.len()),
        ));
    }
    Ok(())
}
