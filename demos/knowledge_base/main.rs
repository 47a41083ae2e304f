//! # Knowledge Base Example
//!
//! Loads a folder of text files, ingests it, and answers a few queries with
//! an assembled context block, the way the chat agent would before calling
//! the model.
//!
//! Uses a deterministic `HashEmbeddingProvider` so it runs with **zero API
//! keys**.
//!
//! Run: `cargo run -p ragbot-demos --example knowledge-base`

use std::fs;
use std::sync::Arc;

use ragbot_rag::{
    DirectorySource, Embedding, EmbeddingProvider, KnowledgeBaseCommand, RagConfig, RagPipeline,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// HashEmbeddingProvider — deterministic bag-of-words embeddings for demos
// ---------------------------------------------------------------------------

struct HashEmbeddingProvider {
    dimensions: usize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> ragbot_rag::Result<Embedding> {
        // Each lowercase word bumps one bucket, so texts sharing words point
        // in similar directions.
        let mut emb = vec![0.0f32; self.dimensions];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            emb[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        Ok(emb)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ragbot_telemetry::init_telemetry("knowledge-base-demo")?;

    // -- 1. Write a small document folder ---------------------------------
    let folder = tempfile::tempdir()?;
    fs::write(
        folder.path().join("rust.txt"),
        "Rust is a systems programming language focused on safety, speed, and concurrency. \
         It achieves memory safety without a garbage collector through its ownership system.",
    )?;
    fs::write(
        folder.path().join("python.md"),
        "# Python\n\nPython is a high-level, interpreted programming language known for its \
         readability. It is widely used in data science, web development, and automation.",
    )?;
    fs::write(
        folder.path().join("rag.txt"),
        "Retrieval-Augmented Generation combines a retrieval system with a language model. \
         Documents are chunked, embedded, and stored in a vector store. At query time the most \
         relevant chunks are retrieved and fed to the model as context.",
    )?;
    fs::write(folder.path().join("notes.pdf"), "skipped: unsupported format")?;

    // -- 2. Build the pipeline --------------------------------------------
    // Small windows so the longer documents produce several chunks.
    let config = RagConfig::builder().chunk_size(120).chunk_overlap(30).top_k(2).build()?;
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbeddingProvider { dimensions: 64 }))
        .build()?;

    // -- 3. Ingest ----------------------------------------------------------
    let documents = DirectorySource::new(folder.path()).load()?;
    let report = pipeline.ingest_documents(&documents).await.into_result()?;
    println!(
        "Ingested {} documents into {} chunks ({} skipped)",
        documents.len(),
        report.chunks_created,
        report.skipped_documents
    );

    // -- 4. Retrieve context for a few questions ---------------------------
    for query in ["memory safety without a garbage collector", "data science language"] {
        println!("\nQuery: \"{query}\"");
        match pipeline.context_for(query).await? {
            Some(context) => println!("{context}"),
            None => println!("  (knowledge base empty, answering without context)"),
        }
    }

    // -- 5. Drive the knowledge base the way the agent does ----------------
    let call = KnowledgeBaseCommand::from_call("get_knowledge_base_stats", json!({}))?;
    println!("\n{}", call.execute(&pipeline).await);

    let call = KnowledgeBaseCommand::from_call(
        "search_knowledge_base",
        json!({ "query": "vector store context", "top_k": 1 }),
    )?;
    println!("\n{}", call.execute(&pipeline).await);

    Ok(())
}
