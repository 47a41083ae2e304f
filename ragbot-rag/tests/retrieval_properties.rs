//! Property tests for chunking and ranking.

use std::collections::HashMap;

use proptest::prelude::*;
use ragbot_rag::{Chunk, Document, EmbeddingStore, cosine_similarity, rank, split_documents};

/// Generate `(chunk_size, chunk_overlap)` with `chunk_overlap < chunk_size`.
fn arb_window() -> impl Strategy<Value = (usize, usize)> {
    (1usize..200).prop_flat_map(|size| (Just(size), 0..size))
}

/// Generate a non-zero embedding of the given dimension.
fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim)
        .prop_filter("non-zero embedding", |v| v.iter().map(|x| x * x).sum::<f32>() > 1e-6)
}

fn store_of(embeddings: Vec<Vec<f32>>) -> EmbeddingStore {
    let chunks = (0..embeddings.len())
        .map(|i| Chunk { content: format!("chunk {i}"), metadata: HashMap::new() })
        .collect();
    EmbeddingStore::from_embedded(chunks, embeddings).unwrap()
}

mod prop_chunking {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_reconstruct_content_and_respect_bounds(
            content in "\\PC{1,800}",
            (size, overlap) in arb_window(),
        ) {
            let chunks = split_documents(&[Document::new(content.clone(), "p.txt")], size, overlap)
                .unwrap();
            prop_assert!(!chunks.is_empty());

            // Every chunk but the last is exactly `size` characters.
            let (last, rest) = chunks.split_last().unwrap();
            for chunk in rest {
                prop_assert_eq!(chunk.content.chars().count(), size);
            }
            prop_assert!(last.content.chars().count() <= size);

            // Consecutive chunks share exactly `overlap` characters.
            for pair in chunks.windows(2) {
                let tail: String = {
                    let chars: Vec<char> = pair[0].content.chars().collect();
                    chars[chars.len() - overlap..].iter().collect()
                };
                let head: String = pair[1].content.chars().take(overlap).collect();
                prop_assert_eq!(tail, head);
            }

            // Dropping the overlap from every chunk after the first rebuilds the content.
            let mut rebuilt = chunks[0].content.clone();
            for chunk in &chunks[1..] {
                rebuilt.extend(chunk.content.chars().skip(overlap));
            }
            prop_assert_eq!(rebuilt, content);
        }

        #[test]
        fn chunks_follow_document_order(
            contents in proptest::collection::vec("[a-z]{1,300}", 1..6),
            (size, overlap) in arb_window(),
        ) {
            let documents: Vec<Document> = contents
                .iter()
                .enumerate()
                .map(|(i, c)| Document::new(c.clone(), format!("doc{i}.txt")))
                .collect();
            let chunks = split_documents(&documents, size, overlap).unwrap();
            let sources: Vec<&str> = chunks.iter().map(|c| c.source().unwrap()).collect();
            let mut sorted = sources.clone();
            sorted.sort_by_key(|s| s.trim_start_matches("doc").trim_end_matches(".txt").parse::<usize>().unwrap());
            prop_assert_eq!(sources, sorted);
        }
    }
}

mod prop_ranking {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_are_bounded_ordered_and_deterministic(
            embeddings in proptest::collection::vec(arb_embedding(DIM), 0..20),
            query in arb_embedding(DIM),
            k in 0usize..25,
        ) {
            let store = store_of(embeddings);
            let first = rank(&query, &store, k);
            let second = rank(&query, &store, k);

            prop_assert_eq!(first.len(), k.min(store.count()));
            prop_assert_eq!(&first, &second);
            for window in first.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }

        #[test]
        fn stored_vector_is_its_own_best_match(
            embeddings in proptest::collection::vec(arb_embedding(DIM), 1..10),
            pick in any::<proptest::sample::Index>(),
        ) {
            let query = embeddings[pick.index(embeddings.len())].clone();
            prop_assert!((cosine_similarity(&query, &query) - 1.0).abs() < 1e-5);

            let store = store_of(embeddings);
            let top = rank(&query, &store, 1);
            prop_assert!((top[0].score - 1.0).abs() < 1e-5);
        }
    }
}
