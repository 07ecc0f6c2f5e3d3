//! Recursive, overlapping text chunking for large documents

use crate::config::DEFAULT_SEPARATORS;
use crate::error::ExtractorError;
use billbuster_domain::Chunk;
use std::collections::VecDeque;
use std::ops::Range;

/// Split `text` into overlapping chunks with the default separators
///
/// Fails with [`ExtractorError::InvalidInput`] when `chunk_size` is zero or
/// `overlap >= chunk_size`.
///
/// # Examples
///
/// ```
/// use billbuster_extractor::chunking::chunk;
///
/// let text = "word ".repeat(1800);
/// let chunks = chunk(&text, 4000, 500).unwrap();
/// assert_eq!(chunks.len(), 3);
/// assert!(chunks.iter().all(|c| c.char_len() <= 4000));
/// ```
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>, ExtractorError> {
    Ok(TextChunker::new(chunk_size, overlap)?.chunk(text))
}

/// Chunks text by recursively splitting on a priority list of separators
///
/// Pieces keep their trailing separator, so the pieces of any span tile it
/// exactly and every chunk is a contiguous slice of the input. Pieces are
/// merged greedily up to `chunk_size`; when a chunk is emitted, the next
/// chunk starts with the trailing pieces of the previous one, as many as fit
/// in `overlap`.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl TextChunker {
    /// Create a chunker with the default separators
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ExtractorError> {
        if chunk_size == 0 {
            return Err(ExtractorError::InvalidInput(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(ExtractorError::InvalidInput(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the separator list (coarsest first)
    ///
    /// Without `""` at the end, pieces that no separator can shrink are
    /// hard-split at `chunk_size`.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Maximum chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Maximum overlap in characters
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let spans = self.split_span(text, 0..text.len(), &self.separators);

        // Span starts never decrease, so byte offsets convert to character
        // offsets with a single forward cursor.
        let mut chunks = Vec::with_capacity(spans.len());
        let mut cursor_byte = 0;
        let mut cursor_char = 0;
        for (index, span) in spans.into_iter().enumerate() {
            cursor_char += text[cursor_byte..span.start].chars().count();
            cursor_byte = span.start;
            let slice = &text[span];
            let len = slice.chars().count();
            chunks.push(Chunk::new(index, slice, cursor_char, cursor_char + len));
        }
        chunks
    }

    fn split_span(&self, text: &str, span: Range<usize>, separators: &[String]) -> Vec<Range<usize>> {
        let current = &text[span.clone()];
        let chosen = separators
            .iter()
            .position(|sep| sep.is_empty() || current.contains(sep.as_str()));

        let Some(position) = chosen else {
            return self.hard_split(text, span);
        };
        let finer = &separators[position + 1..];
        let pieces = split_keeping_separator(text, span, &separators[position]);

        let mut chunks = Vec::new();
        let mut pending = Vec::new();
        for piece in pieces {
            if char_len(text, &piece) <= self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(text, &pending));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.extend(self.hard_split(text, piece));
            } else {
                chunks.extend(self.split_span(text, piece, finer));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(text, &pending));
        }
        chunks
    }

    fn hard_split(&self, text: &str, span: Range<usize>) -> Vec<Range<usize>> {
        let characters = split_keeping_separator(text, span, "");
        self.merge(text, &characters)
    }

    /// Merge contiguous pieces into chunks of at most `chunk_size` characters
    fn merge(&self, text: &str, pieces: &[Range<usize>]) -> Vec<Range<usize>> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(Range<usize>, usize)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(text, piece);

            if total + len > self.chunk_size {
                if let Some(span) = window_span(&window) {
                    chunks.push(span);
                }
                while total > self.overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, released)) => total -= released,
                        None => break,
                    }
                }
            }

            window.push_back((piece.clone(), len));
            total += len;
        }

        if let Some(span) = window_span(&window) {
            chunks.push(span);
        }
        chunks
    }
}

fn window_span(window: &VecDeque<(Range<usize>, usize)>) -> Option<Range<usize>> {
    match (window.front(), window.back()) {
        (Some((first, _)), Some((last, _))) => Some(first.start..last.end),
        _ => None,
    }
}

fn char_len(text: &str, span: &Range<usize>) -> usize {
    text[span.clone()].chars().count()
}

/// Split `span` after every occurrence of `separator`
///
/// The empty separator splits between characters.
fn split_keeping_separator(text: &str, span: Range<usize>, separator: &str) -> Vec<Range<usize>> {
    let slice = &text[span.clone()];
    let base = span.start;

    if separator.is_empty() {
        return slice
            .char_indices()
            .map(|(i, c)| base + i..base + i + c.len_utf8())
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, matched) in slice.match_indices(separator) {
        let end = i + matched.len();
        pieces.push(base + start..base + end);
        start = end;
    }
    if start < slice.len() {
        pieces.push(base + start..span.end);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reconstruct(text: &str, chunks: &[Chunk]) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        let mut covered = 0;
        for chunk in chunks {
            assert!(chunk.char_start <= covered, "gap before chunk {}", chunk.index);
            if chunk.char_end > covered {
                out.extend(&chars[covered..chunk.char_end]);
                covered = chunk.char_end;
            }
        }
        out
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(TextChunker::new(0, 0), Err(ExtractorError::InvalidInput(_))));
        assert!(matches!(TextChunker::new(100, 100), Err(ExtractorError::InvalidInput(_))));
        assert!(matches!(chunk("text", 10, 20), Err(ExtractorError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_text() {
        let chunker = TextChunker::new(100, 10).unwrap();
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_small_text_is_single_chunk() {
        let chunker = TextChunker::new(100, 10).unwrap();
        let text = "Short text here.";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!((chunks[0].char_start, chunks[0].char_end), (0, 16));
    }

    #[test]
    fn test_plain_text_9000_chars() {
        let text = "word ".repeat(1800);
        let chunks = chunk(&text, 4000, 500).unwrap();

        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.char_len() <= 4000);
        }
        for pair in chunks.windows(2) {
            let overlap = pair[0].overlap_with(&pair[1]);
            assert!(overlap <= 500);
            assert!(overlap >= 495, "overlap was {}", overlap);
        }
        assert_eq!(chunks[2].char_end, 9000);
    }

    #[test]
    fn test_unbroken_text_overlaps_exactly() {
        let text = "a".repeat(9000);
        let chunks = chunk(&text, 4000, 500).unwrap();

        let bounds: Vec<_> = chunks.iter().map(|c| (c.char_start, c.char_end)).collect();
        assert_eq!(bounds, vec![(0, 4000), (3500, 7500), (7000, 9000)]);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let paragraph = "Sec. 1. The department shall publish rules.";
        let text = format!("{p}\n\n{p}\n\n{p}", p = paragraph);
        let chunks = chunk(&text, 100, 0).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.ends_with("\n\n"));
        assert!(chunks[1].text.starts_with("Sec. 1."));
    }

    #[test]
    fn test_oversized_paragraph_falls_back_to_finer_separators() {
        let long_paragraph = "funding ".repeat(40);
        let text = format!("Title\n\n{}\n\nEnd", long_paragraph);
        let chunks = chunk(&text, 60, 10).unwrap();

        assert!(chunks.len() > 3);
        for chunk in &chunks {
            assert!(chunk.char_len() <= 60);
        }
        assert_eq!(reconstruct(&text, &chunks), text);
    }

    #[test]
    fn test_hard_split_without_empty_separator() {
        let chunker = TextChunker::new(10, 2).unwrap().with_separators(["\n"]);
        let text = "x".repeat(25);
        let chunks = chunker.chunk(&text);

        assert!(chunks.iter().all(|c| c.char_len() <= 10));
        assert_eq!(reconstruct(&text, &chunks), text);
    }

    #[test]
    fn test_page_markers_are_ordinary_text() {
        let text = "\n\n[PAGE 1]\n\nFirst page.\n\n[PAGE 2]\n\nSecond page.";
        let chunks = chunk(text, 30, 5).unwrap();
        let joined = reconstruct(text, &chunks);
        assert!(joined.contains("[PAGE 2]"));
        assert_eq!(joined, text);
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "§ Définition élargie. ".repeat(20);
        let chunks = chunk(&text, 50, 10).unwrap();

        for chunk in &chunks {
            assert!(chunk.char_len() <= 50);
            assert_eq!(chunk.text.chars().count(), chunk.char_len());
        }
        assert_eq!(reconstruct(&text, &chunks), text);
    }

    proptest! {
        #[test]
        fn prop_chunks_cover_document(
            text in "[a-z \\n§é]{0,400}",
            chunk_size in 1usize..80,
            overlap_seed in 0usize..80,
        ) {
            let overlap = overlap_seed % chunk_size;
            let chunks = chunk(&text, chunk_size, overlap).unwrap();

            if text.is_empty() {
                prop_assert!(chunks.is_empty());
            } else {
                prop_assert_eq!(chunks[0].char_start, 0);
                prop_assert_eq!(chunks.last().unwrap().char_end, text.chars().count());
                prop_assert_eq!(reconstruct(&text, &chunks), text.clone());
            }
        }

        #[test]
        fn prop_chunks_respect_size_and_overlap(
            text in "[a-z \\n]{1,400}",
            chunk_size in 2usize..80,
            overlap_seed in 0usize..80,
        ) {
            let overlap = overlap_seed % chunk_size;
            let chunks = chunk(&text, chunk_size, overlap).unwrap();

            for c in &chunks {
                prop_assert!(c.char_len() <= chunk_size);
            }
            for pair in chunks.windows(2) {
                prop_assert!(pair[0].overlap_with(&pair[1]) <= overlap);
                prop_assert!(pair[1].char_start > pair[0].char_start);
            }
        }
    }
}
