//! Knowledge-base commands for a chat agent.
//!
//! [`KnowledgeBaseCommand`] is the closed set of operations an agent may
//! invoke on a [`RagPipeline`]. A tool call `(name, arguments)` is decoded
//! with [`KnowledgeBaseCommand::from_call`]; unknown names are rejected at
//! decode time rather than looked up at run time.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragbot_rag::KnowledgeBaseCommand;
//!
//! let command = KnowledgeBaseCommand::from_call(
//!     "search_knowledge_base",
//!     json!({ "query": "How do I configure X?", "top_k": 3 }),
//! )?;
//! let reply = command.execute(&pipeline).await;
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::context::assemble;
use crate::error::{RagError, Result};
use crate::pipeline::RagPipeline;
use crate::source::DirectorySource;

/// Number of results returned by a search command without `top_k`.
pub const DEFAULT_SEARCH_RESULTS: usize = 3;

/// Per-chunk character limit in search command replies.
pub const SEARCH_PREVIEW_CHARS: usize = 300;

/// An operation on the knowledge base, tagged by its tool name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum KnowledgeBaseCommand {
    /// Load every supported file under `path` and ingest it.
    LoadDocuments {
        /// Folder to load.
        path: PathBuf,
    },
    /// Search for chunks relevant to `query`.
    SearchKnowledgeBase {
        /// Free-text query.
        query: String,
        /// Number of results; [`DEFAULT_SEARCH_RESULTS`] when omitted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        top_k: Option<usize>,
    },
    /// Report how many chunks are stored.
    GetKnowledgeBaseStats {},
    /// Remove every stored chunk.
    ClearKnowledgeBase {},
}

/// Name, description and JSON schema of one command, for tool declarations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDefinition {
    /// Tool name accepted by [`KnowledgeBaseCommand::from_call`].
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

impl KnowledgeBaseCommand {
    /// Decode a tool call. `args` may be `null` for commands without
    /// arguments.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidCommand`] for an unknown name or arguments
    /// that do not match the command's schema.
    pub fn from_call(name: &str, args: Value) -> Result<Self> {
        let args = if args.is_null() { json!({}) } else { args };
        serde_json::from_value(json!({ "tool": name, "args": args }))
            .map_err(|e| RagError::InvalidCommand(format!("{name}: {e}")))
    }

    /// The tool name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadDocuments { .. } => "load_documents",
            Self::SearchKnowledgeBase { .. } => "search_knowledge_base",
            Self::GetKnowledgeBaseStats {} => "get_knowledge_base_stats",
            Self::ClearKnowledgeBase {} => "clear_knowledge_base",
        }
    }

    /// Declarations for every command.
    pub fn definitions() -> Vec<CommandDefinition> {
        vec![
            CommandDefinition {
                name: "load_documents",
                description: "Load all documents from a folder and store them in the knowledge base.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Folder containing .txt and .md files" }
                    },
                    "required": ["path"]
                }),
            },
            CommandDefinition {
                name: "search_knowledge_base",
                description: "Search the knowledge base for information relevant to a query.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The search query" },
                        "top_k": { "type": "integer", "description": "Maximum number of results" }
                    },
                    "required": ["query"]
                }),
            },
            CommandDefinition {
                name: "get_knowledge_base_stats",
                description: "Get statistics about the knowledge base including chunk count.",
                parameters: json!({ "type": "object", "properties": {} }),
            },
            CommandDefinition {
                name: "clear_knowledge_base",
                description: "Clear all documents from the knowledge base.",
                parameters: json!({ "type": "object", "properties": {} }),
            },
        ]
    }

    /// Run the command and describe the outcome for the chat model.
    ///
    /// Failures are reported in the returned text; the knowledge base keeps
    /// its previous contents when a load fails.
    pub async fn execute(&self, pipeline: &RagPipeline) -> String {
        info!(command = self.name(), "executing knowledge base command");
        match self {
            Self::LoadDocuments { path } => load_documents(pipeline, path.clone()).await,
            Self::SearchKnowledgeBase { query, top_k } => {
                search(pipeline, query, top_k.unwrap_or(DEFAULT_SEARCH_RESULTS)).await
            }
            Self::GetKnowledgeBaseStats {} => {
                format!("Knowledge base contains {} document chunks.", pipeline.count().await)
            }
            Self::ClearKnowledgeBase {} => {
                pipeline.clear().await;
                "Knowledge base has been cleared.".to_string()
            }
        }
    }
}

async fn load_documents(pipeline: &RagPipeline, path: PathBuf) -> String {
    let source = DirectorySource::new(path);
    let documents = match source.load() {
        Ok(documents) => documents,
        Err(e) => {
            error!(error = %e, "failed to load documents");
            return format!("Error loading documents: {e}");
        }
    };
    if documents.is_empty() {
        return format!(
            "No documents found in '{}'. Please add some documents first.",
            source.root().display()
        );
    }

    let report = pipeline.ingest_documents(&documents).await;
    match report.error {
        None => format!(
            "Successfully loaded and processed {} documents. Knowledge base now contains {} chunks.",
            documents.len() - report.skipped_documents,
            pipeline.count().await
        ),
        Some(e) => format!("Failed to process and store documents: {e}"),
    }
}

async fn search(pipeline: &RagPipeline, query: &str, k: usize) -> String {
    if query.trim().is_empty() {
        return "Please provide a 'query' parameter.".to_string();
    }
    match pipeline.search(query, k).await {
        Ok(chunks) if !chunks.is_empty() => format!(
            "Found {} relevant documents for query: '{query}'\n\n{}",
            chunks.len(),
            assemble(&chunks, SEARCH_PREVIEW_CHARS)
        ),
        Ok(_) | Err(RagError::RetrievalUnavailable) => {
            format!("No relevant documents found for query: '{query}'")
        }
        Err(e) => format!("Error searching knowledge base: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::embedding::{Embedding, EmbeddingProvider};

    /// Embeds by counting vowels and consonants.
    struct LetterEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding> {
            let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count() as f32;
            let others = text.chars().filter(|c| c.is_alphabetic()).count() as f32 - vowels;
            Ok(vec![vowels, others])
        }
    }

    fn pipeline() -> RagPipeline {
        RagPipeline::builder().embedding_provider(Arc::new(LetterEmbedder)).build().unwrap()
    }

    #[test]
    fn decodes_known_calls() {
        let command =
            KnowledgeBaseCommand::from_call("search_knowledge_base", json!({ "query": "rust" }))
                .unwrap();
        assert_eq!(
            command,
            KnowledgeBaseCommand::SearchKnowledgeBase { query: "rust".into(), top_k: None }
        );
        let stats = KnowledgeBaseCommand::from_call("get_knowledge_base_stats", Value::Null);
        assert_eq!(stats.unwrap(), KnowledgeBaseCommand::GetKnowledgeBaseStats {});
    }

    #[test]
    fn rejects_unknown_names_and_missing_arguments() {
        let err = KnowledgeBaseCommand::from_call("get_time", Value::Null).unwrap_err();
        assert!(matches!(err, RagError::InvalidCommand(_)));
        let err = KnowledgeBaseCommand::from_call("search_knowledge_base", json!({})).unwrap_err();
        assert!(matches!(err, RagError::InvalidCommand(_)));
    }

    #[test]
    fn definitions_match_command_names() {
        let names: Vec<_> = KnowledgeBaseCommand::definitions().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            [
                "load_documents",
                "search_knowledge_base",
                "get_knowledge_base_stats",
                "clear_knowledge_base"
            ]
        );
        let clear = KnowledgeBaseCommand::from_call("clear_knowledge_base", json!({})).unwrap();
        assert_eq!(clear.name(), "clear_knowledge_base");
    }

    #[tokio::test]
    async fn search_on_empty_knowledge_base_degrades_gracefully() {
        let reply = KnowledgeBaseCommand::SearchKnowledgeBase { query: "rust".into(), top_k: None }
            .execute(&pipeline())
            .await;
        assert_eq!(reply, "No relevant documents found for query: 'rust'");
    }

    #[tokio::test]
    async fn load_search_stats_and_clear() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "aeiou aeiou").unwrap();
        fs::write(temp.path().join("b.txt"), "bcdfg hjklm").unwrap();
        let pipeline = pipeline();

        let load = KnowledgeBaseCommand::LoadDocuments { path: temp.path().to_path_buf() };
        let reply = load.execute(&pipeline).await;
        assert_eq!(
            reply,
            "Successfully loaded and processed 2 documents. Knowledge base now contains 2 chunks."
        );

        let search =
            KnowledgeBaseCommand::SearchKnowledgeBase { query: "ooo".into(), top_k: Some(1) };
        let reply = search.execute(&pipeline).await;
        assert!(reply.starts_with("Found 1 relevant documents for query: 'ooo'\n\nDocument 1"));
        assert!(reply.contains("a.txt"));

        let stats = KnowledgeBaseCommand::GetKnowledgeBaseStats {}.execute(&pipeline).await;
        assert_eq!(stats, "Knowledge base contains 2 document chunks.");

        let cleared = KnowledgeBaseCommand::ClearKnowledgeBase {}.execute(&pipeline).await;
        assert_eq!(cleared, "Knowledge base has been cleared.");
        assert_eq!(pipeline.count().await, 0);
    }

    #[tokio::test]
    async fn load_from_empty_folder_reports_nothing_found() {
        let temp = tempfile::tempdir().unwrap();
        let reply = KnowledgeBaseCommand::LoadDocuments { path: temp.path().to_path_buf() }
            .execute(&pipeline())
            .await;
        assert!(reply.starts_with("No documents found in"));
    }
}
