//! Cosine similarity ranking over an [`EmbeddingStore`].
//!
//! Ranking is an exhaustive O(n) scan: every stored embedding is scored
//! against the query and the best `k` are returned. Scores are sorted with a
//! stable sort, so equal scores keep store insertion order and repeated calls
//! on the same inputs return identical output.

use crate::document::ScoredChunk;
use crate::store::EmbeddingStore;

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude, instead of the NaN a
/// plain division would produce. Vectors of different lengths are compared
/// over their common prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Score `query` against every stored embedding and return the top `k`
/// chunks, highest score first.
///
/// `k` is clamped to the store size; an empty store yields an empty `Vec`.
pub fn rank(query: &[f32], store: &EmbeddingStore, k: usize) -> Vec<ScoredChunk> {
    let k = k.min(store.count());
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f32)> = store
        .entries()
        .enumerate()
        // Adding +0.0 folds -0.0 into +0.0, which `total_cmp` would otherwise
        // order below it.
        .map(|(i, (_, embedding))| (i, cosine_similarity(query, embedding) + 0.0))
        .collect();

    // `sort_by` is stable; `total_cmp` keeps the order total even for NaN.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);

    let chunks = store.chunks();
    scored
        .into_iter()
        .map(|(i, score)| ScoredChunk { chunk: chunks[i].clone(), score })
        .collect()
}
