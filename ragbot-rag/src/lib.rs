//! # ragbot-rag
//!
//! Document retrieval for the ragbot chatbot.
//!
//! Documents are split into overlapping character windows, embedded through
//! an [`EmbeddingProvider`], and kept in an in-memory [`EmbeddingStore`]. A
//! query is embedded the same way, scored against every stored chunk by
//! cosine similarity, and the best matches are rendered into a context block
//! for the chat model's prompt.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragbot_rag::{DirectorySource, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .build()?;
//!
//! let documents = DirectorySource::new("rawdata").load()?;
//! pipeline.ingest_documents(&documents).await.into_result()?;
//!
//! match pipeline.context_for("What is RAG?").await? {
//!     Some(context) => println!("{context}"),
//!     None => println!("knowledge base is empty"),
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Provides |
//! |----------|----------|
//! | `openai` | [`openai::OpenAIEmbeddingProvider`] |

pub mod chunking;
pub mod command;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod pipeline;
pub mod similarity;
pub mod source;
pub mod store;

#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, FixedSizeChunker, split_documents};
pub use command::{CommandDefinition, KnowledgeBaseCommand};
pub use config::{IngestMode, RagConfig, RagConfigBuilder};
pub use context::assemble;
pub use document::{Chunk, Document, ScoredChunk};
pub use embedding::{Embedding, EmbeddingProvider};
pub use error::{RagError, Result};
pub use pipeline::{IngestResult, RagPipeline, RagPipelineBuilder, shared_pipeline};
pub use similarity::{cosine_similarity, rank};
pub use source::DirectorySource;
pub use store::EmbeddingStore;
