//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] — splits by character count with configurable overlap
//! - [`RecursiveChunker`] — splits hierarchically by paragraphs, sentences, then words
//!
//! Both are deterministic: the same document with the same parameters
//! always yields the same chunk sequence. Sizes and overlaps count
//! characters (Unicode scalar values); a chunk never splits a code point.

use std::collections::HashMap;

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings. Embeddings are attached later by the ingestion path.
/// Empty or whitespace-only chunks are never produced.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Build a chunk for `document`, inheriting its metadata plus the
/// citation fields (`title`, `source`, `year`, `url`).
fn build_chunk(document: &Document, chunk_index: usize, text: &str) -> Chunk {
    let mut metadata: HashMap<String, String> = document.metadata.clone();
    metadata.insert("title".to_string(), document.title.clone());
    metadata.insert("source".to_string(), document.source.clone());
    if let Some(year) = &document.year {
        metadata.insert("year".to_string(), year.clone());
    }
    if let Some(url) = &document.url {
        metadata.insert("url".to_string(), url.clone());
    }

    Chunk {
        id: format!("{}_{chunk_index}", document.id),
        text: text.to_string(),
        chunk_index,
        document_id: document.id.clone(),
        embedding: Vec::new(),
        metadata,
    }
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Documents
/// shorter than `chunk_size` produce exactly one chunk. A trailing
/// whitespace-only remainder is dropped.
///
/// # Example
///
/// ```rust,ignore
/// use medrag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(500, 50);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() || self.chunk_size == 0 {
            return Vec::new();
        }

        let text = &document.text;
        // Byte offset of every char boundary, plus the end of the text.
        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bounds.push(text.len());
        let char_count = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            let chunk_text = &text[bounds[start]..bounds[end]];

            if !chunk_text.trim().is_empty() {
                chunks.push(build_chunk(document, chunk_index, chunk_text));
                chunk_index += 1;
            }

            // Once the final window has been emitted, stop: stepping again
            // would re-emit a suffix of it as a degenerate chunk.
            if end == char_count {
                break;
            }
            let step = self.chunk_size.saturating_sub(self.chunk_overlap);
            if step == 0 {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Splits text hierarchically: paragraphs → sentences → words.
///
/// First splits by paragraph separators (`\n\n`). If a paragraph exceeds
/// `chunk_size`, splits by sentence boundaries (`. `, `! `, `? `). If a
/// sentence still exceeds `chunk_size`, splits by word boundaries, and as
/// a last resort by raw character windows.
///
/// # Example
///
/// ```rust,ignore
/// use medrag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(500, 50);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`. If a segment exceeds `chunk_size`, it is split further
/// using the next-level separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if char_len(text) <= chunk_size || separators.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining_separators = &separators[1..];
    let segments = split_keeping_separator(text, separator);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in segments {
        let segment_len = char_len(segment);
        if current.is_empty() {
            current = segment.to_string();
            current_len = segment_len;
        } else if current_len + segment_len <= chunk_size {
            current.push_str(segment);
            current_len += segment_len;
        } else {
            // Current chunk is full — process it
            if current_len > chunk_size {
                chunks.extend(split_and_merge(
                    &current,
                    chunk_size,
                    chunk_overlap,
                    remaining_separators,
                ));
            } else {
                chunks.push(current);
            }
            current = segment.to_string();
            current_len = segment_len;
        }
    }

    if !current.is_empty() {
        if current_len > chunk_size {
            chunks.extend(split_and_merge(&current, chunk_size, chunk_overlap, remaining_separators));
        } else {
            chunks.push(current);
        }
    }

    chunks
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Character-window splitting with overlap, respecting char boundaries.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    let char_count = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[bounds[start]..bounds[end]].to_string());
        if end == char_count {
            break;
        }
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start += step;
    }

    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let separators = ["\n\n", ". ", "! ", "? ", " "];
        let raw_chunks =
            split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, &separators);

        raw_chunks
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .enumerate()
            .map(|(i, text)| build_chunk(document, i, &text))
            .collect()
    }
}
