//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], which
//! slides a window of `chunk_size` characters over each document, advancing by
//! `chunk_size - chunk_overlap` characters so consecutive chunks share exactly
//! `chunk_overlap` characters.
//!
//! Sizes are measured in Unicode scalar values (`char`s), never bytes, so
//! multi-byte text is never split inside a character.

use tracing::debug;

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty content.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size character windows with overlap.
///
/// Each chunk carries a copy of the parent document's metadata.
///
/// # Example
///
/// ```rust,ignore
/// use ragbot_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 200)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunking(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Window size in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap between consecutive windows in characters.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, chunk_overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = split_text(&document.content, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .map(|text| Chunk { content: text.to_string(), metadata: document.metadata.clone() })
            .collect();
        debug!(source = ?document.source(), chunk_count = chunks.len(), "chunked document");
        chunks
    }
}

/// Split every document into overlapping windows, preserving document order
/// and then chunk order within each document.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] for invalid window parameters.
pub fn split_documents(
    documents: &[Document],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Chunk>> {
    let chunker = FixedSizeChunker::new(chunk_size, chunk_overlap)?;
    Ok(documents.iter().flat_map(|document| chunker.chunk(document)).collect())
}

/// Check that a window size and overlap describe a forward-moving window.
pub(crate) fn validate_chunking(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::ConfigError(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Character-window split. Callers must have validated the parameters.
fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, including the end of the string.
    let boundaries: Vec<usize> =
        text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
    let char_count = boundaries.len() - 1;
    let step = chunk_size - chunk_overlap;

    let mut chunks = Vec::with_capacity(char_count / step + 1);
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(char_count);
        chunks.push(&text[boundaries[start]..boundaries[end]]);
        if end == char_count {
            break;
        }
        start += step;
    }
    chunks
}
