//! Chunk module - bounded slices of a document

use serde::{Deserialize, Serialize};

/// A contiguous slice of document text
///
/// Offsets count characters (Unicode scalar values), not bytes, and
/// `char_end` is exclusive. Adjacent chunks may overlap: the tail of one
/// chunk is repeated at the head of the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of the chunk in the document, starting at 0
    pub index: usize,

    /// The chunk text
    pub text: String,

    /// Character offset of the first character
    pub char_start: usize,

    /// Character offset one past the last character
    pub char_end: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(index: usize, text: impl Into<String>, char_start: usize, char_end: usize) -> Self {
        Self {
            index,
            text: text.into(),
            char_start,
            char_end,
        }
    }

    /// Length of the chunk in characters
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }

    /// Number of characters shared with the chunk that follows
    pub fn overlap_with(&self, next: &Chunk) -> usize {
        self.char_end.saturating_sub(next.char_start)
    }

    /// The first `max_chars` characters of the text
    pub fn head(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.text[..byte_idx],
            None => &self.text,
        }
    }
}
