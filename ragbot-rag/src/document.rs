//! Data types for documents, chunks, and ranked results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key identifying where a document came from.
pub const SOURCE_KEY: &str = "source";

/// Metadata key describing what kind of source produced a document.
pub const TYPE_KEY: &str = "type";

/// A loaded input document: text plus provenance metadata.
///
/// `metadata` should always carry a [`SOURCE_KEY`] entry; it may also carry
/// [`TYPE_KEY`] (e.g. `"text_file"` or `"website"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// The text content of the document.
    pub content: String,
    /// Key-value metadata describing the document.
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with the given content and `source` metadata.
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        let metadata = HashMap::from([(SOURCE_KEY.to_string(), source.into())]);
        Self { content: content.into(), metadata }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `source` metadata entry, if present.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).map(String::as_str)
    }
}

/// A contiguous slice of a [`Document`]'s content.
///
/// `metadata` is the parent document's metadata, unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// The text of this slice.
    pub content: String,
    /// Metadata inherited from the parent document.
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// The `source` metadata entry, if present.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).map(String::as_str)
    }
}

/// A [`Chunk`] paired with its cosine similarity to a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
