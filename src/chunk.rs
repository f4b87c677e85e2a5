//! Sentence-aware overlapping text chunker.
//!
//! Splits note text into [`TextChunk`]s of at most `max_chunk_size`
//! characters. Windows prefer to end on a sentence terminator found in
//! their last [`SENTENCE_LOOKBACK`] characters, and consecutive windows
//! share `overlap` characters.
//!
//! Sizes are measured in `char`s, never bytes, so multi-byte text cannot
//! be split inside a code point.

use crate::config::ChunkingConfig;
use crate::models::TextChunk;

/// How far back from a window's end to look for a sentence boundary.
pub const SENTENCE_LOOKBACK: usize = 200;

/// Split text into trimmed, non-empty chunks.
///
/// Returns `[]` for blank input and the whole trimmed text when it fits in
/// one chunk. The cursor strictly advances every iteration, so this
/// terminates for any `overlap`.
pub fn chunk_text(text: &str, max_chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let max_chunk_size = max_chunk_size.max(1);
    if chars.len() <= max_chunk_size {
        return vec![text.trim().to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let mut end = (start + max_chunk_size).min(chars.len());

        if end < chars.len() {
            if let Some(boundary) = sentence_boundary(&chars, start, end) {
                end = boundary;
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if end >= chars.len() {
            break;
        }

        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    chunks
}

/// Chunk a note and number the pieces from 0.
pub fn chunk_note(title: &str, text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    chunk_text(text, config.max_chunk_size, config.overlap)
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk {
            source_title: title.to_string(),
            index,
            text,
        })
        .collect()
}

/// Position just after the last `.`, `!` or `?` that is followed by
/// whitespace inside `chars[start..end]`, searching only the last
/// [`SENTENCE_LOOKBACK`] characters.
fn sentence_boundary(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let search_from = end.saturating_sub(SENTENCE_LOOKBACK).max(start);
    (search_from..end.saturating_sub(1))
        .rev()
        .find(|&i| matches!(chars[i], '.' | '!' | '?') && chars[i + 1].is_whitespace())
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_text("Hello world", 500, 50);
        assert_eq!(chunks, vec!["Hello world".to_string()]);
    }

    #[test]
    fn test_small_text_is_trimmed() {
        let chunks = chunk_text("  Hello world \n", 500, 50);
        assert_eq!(chunks, vec!["Hello world".to_string()]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", 500, 50).is_empty());
        assert!(chunk_text("   \n\t ", 500, 50).is_empty());
    }

    #[test]
    fn test_long_run_without_boundaries() {
        let text = "a".repeat(2000);
        let chunks = chunk_text(&text, 500, 50);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 550, "chunk too long: {}", c.len());
        }
        // windows start at 0, 450, 900, 1350, 1800
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[4].len(), 200);
    }

    #[test]
    fn test_breaks_on_sentence_boundary() {
        let sentence = "This sentence is exactly forty chars ok. ";
        assert_eq!(sentence.chars().count(), 41);
        let text = sentence.repeat(10);
        let chunks = chunk_text(&text, 100, 0);
        for c in &chunks {
            assert!(c.ends_with('.'), "chunk does not end a sentence: {:?}", c);
            assert!(c.chars().count() <= 100);
        }
    }

    #[test]
    fn test_boundary_needs_trailing_whitespace() {
        // "3.14" is not a sentence end
        let text = format!("{}3.14{}", "x".repeat(40), "y".repeat(80));
        let chunks = chunk_text(&text, 100, 0);
        assert_eq!(chunks[0].chars().count(), 100);
    }

    #[test]
    fn test_overlap_shares_text() {
        let text: String = (0..300).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text, 100, 20);
        assert!(chunks.len() >= 3);
        // ASCII input, so byte offsets are char offsets
        assert!(chunks[1].starts_with(&chunks[0][80..]));
    }

    #[test]
    fn test_degenerate_overlap_still_terminates() {
        let text = "word. ".repeat(500);
        // overlap larger than any window
        let chunks = chunk_text(&text, 50, 500);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_terminates_for_many_configurations() {
        let text = "Short. Sentences! Here? And a much longer one follows it. ".repeat(40);
        for max in [1usize, 2, 7, 50, 199, 200, 201, 1000] {
            for overlap in [0usize, 1, max / 2, max.saturating_sub(1)] {
                let chunks = chunk_text(&text, max, overlap);
                assert!(!chunks.is_empty());
                for c in &chunks {
                    assert!(!c.is_empty());
                    assert!(c.chars().count() <= max);
                }
            }
        }
    }

    #[test]
    fn test_multibyte_text_is_not_split_mid_char() {
        let text = "日本語のテキスト。".repeat(100);
        let chunks = chunk_text(&text, 64, 8);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 64);
        }
    }

    #[test]
    fn test_chunk_note_indices_contiguous() {
        let config = ChunkingConfig {
            max_chunk_size: 100,
            overlap: 10,
        };
        let text = "Paragraph number one. ".repeat(30);
        let chunks = chunk_note("Daily log", &text, &config);
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
            assert_eq!(c.source_title, "Daily log");
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha. Beta! Gamma? Delta. ".repeat(50);
        assert_eq!(chunk_text(&text, 120, 30), chunk_text(&text, 120, 30));
    }
}
