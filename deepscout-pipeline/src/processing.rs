//! Text normalization and chunking
//!
//! Cleans raw source text (PDF extractions tend to carry page numbers and
//! stray symbols) and splits it into fixed-size windows for embedding.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TRAILING_PAGE_NUMBERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:\b\d+\s*)+$").unwrap());
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\.\,\;\:\!\?\-\(\)]").unwrap());

/// Normalize raw text for ingestion.
///
/// Strips bare digit sequences at line ends (page-number artifacts), removes
/// characters outside a conservative allow-list, collapses whitespace runs,
/// and trims. Idempotent: normalizing a normalized string is a no-op.
pub fn normalize(text: &str) -> String {
    let original_length = text.len();

    // Page-number stripping is line-based, so it runs before whitespace
    // collapsing folds the newlines away. It runs once more afterwards
    // because removing a disallowed character can leave a bare digit run at
    // the end, and the result must be a fixpoint.
    let text = TRAILING_PAGE_NUMBERS.replace_all(text, "");
    let text = DISALLOWED_CHARS.replace_all(&text, " ");
    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    let text = TRAILING_PAGE_NUMBERS.replace_all(&text, "");
    let normalized = text.trim().to_string();

    debug!(
        "Text normalization: {} -> {} characters",
        original_length,
        normalized.len()
    );
    normalized
}

/// Split text into non-overlapping windows of `size` characters.
///
/// Windows cover the entire string in order; the final window may be
/// shorter. Boundaries are measured in characters so multi-byte text never
/// splits inside a code point.
pub fn chunk(text: &str, size: usize) -> Vec<String> {
    assert!(size > 0, "chunk size must be positive");

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|window| window.iter().collect())
        .collect()
}

/// Truncate text to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("hello   world\n\nfoo"), "hello world foo");
    }

    #[test]
    fn normalize_strips_trailing_page_numbers() {
        let text = "Introduction to graphs 12\nSecond line 3\nkeeps 3 inline words";
        let normalized = normalize(text);
        assert!(!normalized.contains("12"));
        assert!(normalized.contains("keeps 3 inline"));
    }

    #[test]
    fn normalize_strips_disallowed_characters() {
        assert_eq!(normalize("a@b #c$ (d)!"), "a b c (d)!");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "  Messy\ttext with   42\nartifacts @@ and (notes).  ",
            "plain text",
            "",
            "múltí-byte tëxt 7\n",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn chunk_covers_entire_string() {
        let text = "abcdefghij";
        for size in 1..=12 {
            let chunks = chunk(text, size);
            assert_eq!(chunks.concat(), text);
            assert_eq!(chunks.len(), text.len().div_ceil(size));
        }
    }

    #[test]
    fn chunk_final_window_may_be_shorter() {
        let chunks = chunk("abcdefg", 3);
        assert_eq!(chunks, vec!["abc", "def", "g"]);
    }

    #[test]
    fn chunk_empty_text_yields_no_chunks() {
        assert!(chunk("", 100).is_empty());
    }

    #[test]
    fn chunk_respects_char_boundaries() {
        let text = "héllo wörld";
        let chunks = chunk(text, 4);
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks.len(), text.chars().count().div_ceil(4));
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
