//! Retrieval pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates ingestion (chunk → embed → store) and
//! search (embed query → rank → optionally assemble context) over a single
//! in-memory [`EmbeddingStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragbot_rag::{Document, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .build()?;
//!
//! let report = pipeline.ingest_documents(&[Document::new("...", "a.txt")]).await;
//! let chunks = pipeline.search("search query", 5).await?;
//! ```

use std::sync::{Arc, OnceLock};

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::context::assemble;
use crate::document::{Chunk, Document, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::similarity::rank;
use crate::store::EmbeddingStore;

/// Outcome of [`RagPipeline::ingest_documents`].
///
/// Ingestion never panics or aborts the caller: failures are reported here
/// with `success == false`, `chunks_created == 0` and the cause in `error`.
#[derive(Debug)]
pub struct IngestResult {
    /// Number of chunks committed to the store by this batch.
    pub chunks_created: usize,
    /// Number of documents skipped because they had no content.
    pub skipped_documents: usize,
    /// Whether the batch was committed.
    pub success: bool,
    /// The failure, when `success` is false.
    pub error: Option<RagError>,
}

impl IngestResult {
    fn committed(chunks_created: usize, skipped_documents: usize) -> Self {
        Self { chunks_created, skipped_documents, success: true, error: None }
    }

    fn failed(skipped_documents: usize, error: RagError) -> Self {
        Self { chunks_created: 0, skipped_documents, success: false, error: Some(error) }
    }

    /// Convert into a `Result`, returning the recorded error on failure.
    pub fn into_result(self) -> Result<Self> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}

/// The retrieval pipeline.
///
/// The store sits behind a `tokio::sync::RwLock`: searches and counts share
/// the read lock, while ingestion and clearing take the write lock, so two
/// mutations never interleave. Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    store: RwLock<EmbeddingStore>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Chunk, embed and store a batch of documents.
    ///
    /// Documents with empty or whitespace-only content are skipped and
    /// counted in [`IngestResult::skipped_documents`]. The remaining
    /// documents are chunked and embedded in one batch, then committed
    /// according to [`RagConfig::ingest_mode`]. If the chunker yields
    /// nothing or embedding fails, the store keeps its previous contents.
    pub async fn ingest_documents(&self, documents: &[Document]) -> IngestResult {
        let (usable, skipped): (Vec<&Document>, Vec<&Document>) =
            documents.iter().partition(|d| !d.content.trim().is_empty());
        let skipped_documents = skipped.len();
        for document in &skipped {
            warn!(source = ?document.source(), "skipping document with empty content");
        }

        if usable.is_empty() {
            warn!(skipped_documents, "no documents to process");
            return IngestResult::failed(skipped_documents, RagError::NoDocuments);
        }

        let chunks: Vec<Chunk> = usable.iter().flat_map(|d| self.chunker.chunk(d)).collect();
        let chunk_count = chunks.len();
        if chunks.is_empty() {
            warn!(documents = usable.len(), "chunker produced no chunks");
            return IngestResult::failed(skipped_documents, RagError::NoDocuments);
        }

        let mut store = self.store.write().await;
        match store
            .ingest_with_mode(chunks, self.embedding_provider.as_ref(), self.config.ingest_mode)
            .await
        {
            Ok(chunks_created) => {
                info!(
                    documents = usable.len(),
                    skipped_documents,
                    chunks_created,
                    stored = store.count(),
                    "ingested documents"
                );
                IngestResult::committed(chunks_created, skipped_documents)
            }
            Err(e) => {
                error!(chunk_count, error = %e, "embedding failed during ingestion");
                IngestResult::failed(skipped_documents, e)
            }
        }
    }

    /// Return the `k` chunks most similar to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalUnavailable`] if the store is empty and
    /// [`RagError::EmbeddingError`] if the query cannot be embedded.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        let results = self.search_scored(query, k).await?;
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }

    /// Like [`search`](Self::search), but keeps the similarity scores.
    pub async fn search_scored(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let store = self.store.read().await;
        if store.is_empty() {
            warn!("search requested against an empty knowledge base");
            return Err(RagError::RetrievalUnavailable);
        }

        let provider = self.embedding_provider.as_ref();
        let query_embedding = provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            match e {
                RagError::EmbeddingError { .. } => e,
                other => RagError::EmbeddingError {
                    provider: provider.name().to_string(),
                    message: other.to_string(),
                },
            }
        })?;

        if let Some(dimensions) = store.dimensions() {
            if query_embedding.len() != dimensions {
                error!(
                    expected = dimensions,
                    got = query_embedding.len(),
                    "query dimension mismatch"
                );
                return Err(RagError::EmbeddingError {
                    provider: provider.name().to_string(),
                    message: format!(
                        "query embedding has {} dimensions, store has {dimensions}",
                        query_embedding.len()
                    ),
                });
            }
        }

        let results = rank(&query_embedding, &store, k);
        info!(result_count = results.len(), k, "search completed");
        Ok(results)
    }

    /// Search with the configured `top_k` and render the hits as a context
    /// block using the configured `max_context_chars`.
    ///
    /// Returns `Ok(None)` when the knowledge base is empty so the caller can
    /// answer without context.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the query cannot be embedded.
    pub async fn context_for(&self, query: &str) -> Result<Option<String>> {
        match self.search(query, self.config.top_k).await {
            Ok(chunks) => Ok(Some(assemble(&chunks, self.config.max_context_chars))),
            Err(RagError::RetrievalUnavailable) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Number of stored chunks.
    pub async fn count(&self) -> usize {
        self.store.read().await.count()
    }

    /// Remove every stored chunk.
    pub async fn clear(&self) {
        self.store.write().await.clear();
        info!("cleared knowledge base");
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// Only the embedding provider is required. Without an explicit chunker the
/// pipeline uses a [`FixedSizeChunker`] sized from the configuration.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .chunker(Arc::new(chunker))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    store: Option<EmbeddingStore>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Start from a pre-populated store instead of an empty one.
    pub fn store(mut self, store: EmbeddingStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the [`RagPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the embedding provider is missing
    /// or the configuration is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(RagPipeline {
            config,
            embedding_provider,
            chunker,
            store: RwLock::new(self.store.unwrap_or_default()),
        })
    }
}

static SHARED_PIPELINE: OnceLock<RagPipeline> = OnceLock::new();

/// Process-wide pipeline, constructed by `init` on first use.
///
/// Later calls return the same instance and never run their `init`.
/// Concurrent first calls are safe: exactly one `init` runs and the others
/// wait for it.
pub fn shared_pipeline(init: impl FnOnce() -> RagPipeline) -> &'static RagPipeline {
    SHARED_PIPELINE.get_or_init(init)
}
