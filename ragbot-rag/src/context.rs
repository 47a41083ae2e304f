//! Formatting of ranked chunks into a prompt context block.
//!
//! Each chunk becomes one paragraph:
//!
//! ```text
//! Document 1 (Source: a.txt):
//! <content, at most max_chars_per_chunk characters, then "..." if cut>
//! ```
//!
//! Paragraphs are separated by a blank line.

use crate::document::Chunk;

/// Default per-chunk character limit.
pub const DEFAULT_MAX_CHARS_PER_CHUNK: usize = 500;

/// Appended to content that was cut at the character limit.
pub const TRUNCATION_MARKER: &str = "...";

const UNKNOWN_SOURCE: &str = "Unknown";

/// Render `chunks` as a numbered, source-labelled context block.
///
/// Returns an empty string for an empty slice.
pub fn assemble(chunks: &[Chunk], max_chars_per_chunk: usize) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            format!(
                "Document {} (Source: {}):\n{}",
                i + 1,
                chunk.source().unwrap_or(UNKNOWN_SOURCE),
                truncate_chars(&chunk.content, max_chars_per_chunk)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::document::SOURCE_KEY;

    fn chunk(content: &str, source: Option<&str>) -> Chunk {
        let mut metadata = HashMap::new();
        if let Some(source) = source {
            metadata.insert(SOURCE_KEY.to_string(), source.to_string());
        }
        Chunk { content: content.to_string(), metadata }
    }

    #[test]
    fn labels_each_chunk_with_index_and_source() {
        let context = assemble(&[chunk("alpha", Some("a.txt")), chunk("beta", Some("b.txt"))], 500);
        assert_eq!(context, "Document 1 (Source: a.txt):\nalpha\n\nDocument 2 (Source: b.txt):\nbeta");
    }

    #[test]
    fn truncates_long_content_with_marker() {
        let context = assemble(&[chunk("abcdefghij", Some("a.txt"))], 4);
        assert_eq!(context, "Document 1 (Source: a.txt):\nabcd...");
    }

    #[test]
    fn content_at_limit_is_not_marked() {
        let context = assemble(&[chunk("abcd", Some("a.txt"))], 4);
        assert!(context.ends_with("\nabcd"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let context = assemble(&[chunk("ééééé", None)], 2);
        assert_eq!(context, "Document 1 (Source: Unknown):\néé...");
    }

    #[test]
    fn empty_input_yields_empty_context() {
        assert_eq!(assemble(&[], 500), "");
    }
}
