//! Data types for documents, chunks, search results, and answers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and citation metadata.
///
/// Documents are immutable once ingested: the ingestion path splits them
/// into [`Chunk`]s and only the chunks persist in the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// Human-readable title, used in citation rendering.
    pub title: String,
    /// The text content of the document.
    pub text: String,
    /// Where the document came from (file name, registry, journal).
    pub source: String,
    /// Optional publication year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Optional URL pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Key-value metadata associated with the document.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with the given id, title, text, and source, and
    /// no further metadata.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            source: source.into(),
            year: None,
            url: None,
            metadata: HashMap::new(),
        }
    }
}

/// A segment of a [`Document`] with its vector embedding.
///
/// Chunk metadata inherits the parent document's metadata plus the
/// `title`, `source`, and (when present) `year` and `url` fields, so
/// citations can be reconstructed from the index alone without re-reading
/// the original source documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk (`{document_id}_{chunk_index}`).
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Zero-based position of this chunk within its parent document.
    pub chunk_index: usize,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Key-value metadata inherited from the parent document plus
    /// citation fields.
    pub metadata: HashMap<String, String>,
}

/// A retrieved [`Chunk`] paired with a relevance score in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A citation entry in an [`AnswerResponse`].
///
/// `doc_id` is the positional `DOC_i` label the answer's inline citation
/// markers refer to; `chunk_id` identifies the underlying index entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Positional citation label (`DOC_1`, `DOC_2`, ...).
    pub doc_id: String,
    /// Identifier of the retrieved chunk.
    pub chunk_id: String,
    /// Title of the parent document.
    pub title: String,
    /// Publication year, when recorded at ingestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// URL of the original source, when recorded at ingestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Retrieval similarity score for the cited chunk.
    pub relevance_score: f32,
    /// Excerpt of the chunk text, truncated for display.
    pub excerpt: String,
}

/// The response to a single query: a generated answer with inline
/// `[DOC_i]` citation markers, the sources those markers refer to, a
/// retrieval-derived confidence score, and timing breakdowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// The original question.
    pub question: String,
    /// Generated answer text with inline citation markers.
    pub answer: String,
    /// Retrieved sources in citation order.
    pub sources: Vec<Source>,
    /// Confidence in `[0, 1]`, derived from the retrieval similarity
    /// distribution. Exactly 0 on the refusal path.
    pub confidence: f32,
    /// Time spent embedding the query and searching the index.
    pub retrieval_time_ms: f64,
    /// Time spent in the generation call (0 on the refusal path).
    pub generation_time_ms: f64,
    /// End-to-end processing time.
    pub total_time_ms: f64,
    /// Advisory warning attached to refused or degraded answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
