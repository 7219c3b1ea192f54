//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable identifier for the document, e.g. the source file name.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Where the text was read from, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document with no metadata and no source URI.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new(), source_uri: None }
    }

    /// Attach a source URI.
    pub fn with_source_uri(mut self, uri: impl Into<String>) -> Self {
        self.source_uri = Some(uri.into());
        self
    }

    /// Whether the document has no non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A contiguous window of a [`Document`]'s text.
///
/// Offsets count characters (Unicode scalar values), not bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Identifier of the form `{document_id}_{sequence_index}`.
    pub id: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// 0-based position among the chunks of the same document.
    pub sequence_index: usize,
    /// Inclusive start offset in characters.
    pub start_offset: usize,
    /// Exclusive end offset in characters.
    pub end_offset: usize,
    /// The text between the two offsets.
    pub text: String,
}

impl Chunk {
    /// Number of characters covered by this chunk.
    pub fn char_len(&self) -> usize {
        self.end_offset - self.start_offset
    }
}

/// A retrieved [`Chunk`] paired with its distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Squared Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

/// The ranked answer to one query against one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// The document the searched snapshot was built from.
    pub document_id: String,
    /// Generation number of the searched snapshot.
    pub generation: u64,
    /// Hits ordered by ascending distance.
    pub hits: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Chunk texts in rank order, as handed to a generator.
    pub fn texts(&self) -> Vec<String> {
        self.hits.iter().map(|hit| hit.chunk.text.clone()).collect()
    }

    /// Render the hits as a markdown source-verification view.
    ///
    /// ```rust,ignore
    /// println!("{}", result.render_markdown());
    /// ```
    pub fn render_markdown(&self) -> String {
        let mut out = String::from("### Retrieved context sources\n\n");
        if self.hits.is_empty() {
            out.push_str("*No context retrieved.*\n");
            return out;
        }
        for (rank, hit) in self.hits.iter().enumerate() {
            let _ = write!(
                out,
                "**Chunk {}** (chars {}..{}, distance {:.4})\n```text\n{}\n```\n\n---\n\n",
                rank + 1,
                hit.chunk.start_offset,
                hit.chunk.end_offset,
                hit.distance,
                hit.chunk.text
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(start: usize, end: usize, text: &str, distance: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: format!("doc_{start}"),
                document_id: "doc".into(),
                sequence_index: 0,
                start_offset: start,
                end_offset: end,
                text: text.into(),
            },
            distance,
        }
    }

    #[test]
    fn markdown_lists_hits_in_rank_order() {
        let result = RetrievalResult {
            document_id: "doc".into(),
            generation: 1,
            hits: vec![hit(450, 600, "closest", 0.25), hit(0, 500, "second", 1.5)],
        };
        let md = result.render_markdown();
        assert!(md.starts_with("### Retrieved context sources"));
        assert!(md.contains("**Chunk 1** (chars 450..600, distance 0.2500)"));
        assert!(md.find("closest") < md.find("second"));
        assert_eq!(result.texts(), vec!["closest", "second"]);
    }

    #[test]
    fn markdown_for_no_hits() {
        let result = RetrievalResult { document_id: "doc".into(), generation: 1, hits: vec![] };
        assert!(result.render_markdown().contains("*No context retrieved.*"));
    }

    #[test]
    fn whitespace_only_document_is_blank() {
        assert!(Document::new("d", " \n\t").is_blank());
        assert!(!Document::new("d", " x ").is_blank());
    }
}
