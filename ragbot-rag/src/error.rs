//! Error types for the `ragbot-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid chunking or retrieval parameters.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The embedding collaborator failed, returned the wrong number of
    /// vectors, or returned vectors of inconsistent dimensionality.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider involved in the failure.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A search was attempted against an empty store.
    #[error("Retrieval unavailable: the knowledge base is empty")]
    RetrievalUnavailable,

    /// An ingestion batch contained no document with content.
    #[error("No documents to process")]
    NoDocuments,

    /// A document source could not be read.
    #[error("Source error ({path}): {message}")]
    SourceError {
        /// The path that failed.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// A knowledge-base command could not be decoded.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl RagError {
    pub(crate) fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingError { provider: provider.into(), message: message.into() }
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
