//! Fixed-size overlapping chunking.
//!
//! Text is cut into windows of `chunk_size` characters whose starts are
//! `chunk_size - overlap` characters apart. Iteration stops once the cursor
//! passes the end of the text, or right after a window that had to be
//! clipped at the end, so only the last window may be shorter than
//! `chunk_size`.
//!
//! Parameters are validated up front by [`ChunkParams::new`], so iteration
//! always makes forward progress and terminates after at most
//! `ceil(len / (chunk_size - overlap))` windows.
//!
//! Offsets are character offsets; a window never splits a UTF-8 sequence.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s in increasing `sequence_index` order.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Validated window parameters: `chunk_size > 0` and `overlap < chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkParams {
    /// Validate and create window parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `chunk_size` is zero or
    /// `overlap >= chunk_size` (the cursor would never advance).
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidConfiguration(format!(
                "chunk_overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance in characters between consecutive window starts. Always > 0.
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Upper bound on the number of windows for a text of `char_len` characters.
    pub fn max_windows(&self, char_len: usize) -> usize {
        char_len.div_ceil(self.step())
    }

    /// Iterate over the windows of `text`.
    pub fn windows<'a>(&self, text: &'a str) -> ChunkIter<'a> {
        ChunkIter { text, params: *self, byte_pos: 0, char_pos: 0, sequence_index: 0 }
    }
}

/// Split `text` into overlapping windows.
///
/// # Errors
///
/// Returns [`RagError::InvalidConfiguration`] for invalid parameters. Empty
/// text is not an error; it yields no windows.
///
/// # Example
///
/// ```rust,ignore
/// let windows: Vec<_> = docrag::chunking::chunk(&text, 500, 50)?.collect();
/// ```
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<ChunkIter<'_>> {
    Ok(ChunkParams::new(chunk_size, overlap)?.windows(text))
}

/// One window produced by [`ChunkIter`], borrowing from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    pub sequence_index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: &'a str,
}

/// Lazy iterator over the windows of a text.
///
/// A clone resumes from the same position. Call [`ChunkParams::windows`]
/// again to re-chunk from the beginning.
#[derive(Debug, Clone)]
pub struct ChunkIter<'a> {
    text: &'a str,
    params: ChunkParams,
    byte_pos: usize,
    char_pos: usize,
    sequence_index: usize,
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Window<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.byte_pos >= self.text.len() {
            return None;
        }

        let rest = &self.text[self.byte_pos..];
        let step = self.params.step();
        let chunk_size = self.params.chunk_size;

        let mut end_byte = rest.len();
        let mut next_byte = rest.len();
        let mut width = 0;
        for (i, (byte, _)) in rest.char_indices().enumerate() {
            if i == step {
                next_byte = byte;
            }
            if i == chunk_size {
                end_byte = byte;
                break;
            }
            width += 1;
        }

        let window = Window {
            sequence_index: self.sequence_index,
            start_offset: self.char_pos,
            end_offset: self.char_pos + width,
            text: &rest[..end_byte],
        };

        if width < chunk_size {
            // Clipped at the end; later windows would be shorter still.
            self.byte_pos = self.text.len();
        } else {
            self.byte_pos += next_byte;
        }
        self.char_pos += step;
        self.sequence_index += 1;
        Some(window)
    }
}

impl std::iter::FusedIterator for ChunkIter<'_> {}

/// Splits documents into fixed-size chunks by character count with overlap.
///
/// Chunk IDs are generated as `{document_id}_{sequence_index}`.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(500, 50)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    params: ChunkParams,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `chunk_overlap >= chunk_size`
    /// or `chunk_size == 0`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Ok(Self { params: ChunkParams::new(chunk_size, chunk_overlap)? })
    }

    /// Create a chunker from already validated parameters.
    pub fn from_params(params: ChunkParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> ChunkParams {
        self.params
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.params
            .windows(&document.text)
            .map(|window| Chunk {
                id: format!("{}_{}", document.id, window.sequence_index),
                document_id: document.id.clone(),
                sequence_index: window.sequence_index,
                start_offset: window.start_offset,
                end_offset: window.end_offset,
                text: window.text.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_advancing_parameters() {
        assert!(matches!(ChunkParams::new(10, 10), Err(RagError::InvalidConfiguration(_))));
        assert!(matches!(ChunkParams::new(10, 11), Err(RagError::InvalidConfiguration(_))));
        assert!(matches!(ChunkParams::new(0, 0), Err(RagError::InvalidConfiguration(_))));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert_eq!(chunk("", 4, 1).unwrap().count(), 0);
    }

    #[test]
    fn windows_respect_char_boundaries() {
        let windows: Vec<_> = chunk("héllo wörld", 4, 1).unwrap().collect();
        let texts: Vec<&str> = windows.iter().map(|w| w.text).collect();
        assert_eq!(texts, vec!["héll", "lo w", "wörl", "ld"]);
        assert_eq!((windows[3].start_offset, windows[3].end_offset), (9, 11));
    }

    #[test]
    fn zero_overlap_tiles_the_text() {
        let windows: Vec<_> = chunk("abcdefg", 3, 0).unwrap().map(|w| w.text).collect();
        assert_eq!(windows, vec!["abc", "def", "g"]);
    }

    #[test]
    fn stops_after_the_first_clipped_window() {
        // Step 1: the window at 3 is clipped, so 4 and 5 are never emitted.
        let windows: Vec<_> = chunk("abcdef", 4, 3).unwrap().collect();
        let spans: Vec<_> = windows.iter().map(|w| (w.start_offset, w.end_offset)).collect();
        assert_eq!(spans, vec![(0, 4), (1, 5), (2, 6), (3, 6)]);
        assert!(windows.len() <= ChunkParams::new(4, 3).unwrap().max_windows(6));
    }

    #[test]
    fn full_window_at_the_end_is_followed_by_the_tail() {
        let text = "x".repeat(950);
        let spans: Vec<_> =
            chunk(&text, 500, 50).unwrap().map(|w| (w.start_offset, w.end_offset)).collect();
        assert_eq!(spans, vec![(0, 500), (450, 950), (900, 950)]);
    }

    #[test]
    fn exact_fit_emits_no_empty_window() {
        let spans: Vec<_> =
            chunk("abcdef", 3, 0).unwrap().map(|w| (w.start_offset, w.end_offset)).collect();
        assert_eq!(spans, vec![(0, 3), (3, 6)]);
    }
}
