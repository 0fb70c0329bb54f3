//! Flat vector index with exact cosine-similarity search and disk
//! persistence.
//!
//! [`FlatIndex`] is an insertion-ordered collection of embedded chunks.
//! It is built once per ingestion run, read-only afterwards, and replaced
//! wholesale on re-ingestion — there is no upsert or delete. Because the
//! index never mutates after [`build`](FlatIndex::build), it can be shared
//! behind an `Arc` across any number of concurrent queries without locks.
//!
//! The persisted artifact records the embedding model identifier, the
//! vector dimensionality, and the chunking parameters alongside the chunk
//! texts, metadata, and vectors — enough to validate compatibility on
//! load and to reconstruct citations without re-reading source documents.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

/// Version tag of the persisted artifact layout.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Header describing how an index was built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexMeta {
    /// Artifact layout version.
    pub format_version: u32,
    /// Identifier of the embedding model that produced the vectors.
    pub embedding_model_id: String,
    /// Dimensionality of every vector in the index.
    pub dimensions: usize,
    /// Chunk size (characters) used at ingestion.
    pub chunk_size: usize,
    /// Chunk overlap (characters) used at ingestion.
    pub chunk_overlap: usize,
}

/// An exact nearest-neighbor index over cosine similarity.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlatIndex {
    meta: IndexMeta,
    entries: Vec<Chunk>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl FlatIndex {
    /// Bulk-load an index from embedded chunks.
    ///
    /// Every chunk's embedding must have the dimensionality declared in
    /// `meta` — this is the construction-time invariant that lets
    /// [`search`](FlatIndex::search) skip per-entry checks. Insertion
    /// order is preserved and serves as the tie-break order for search.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `meta.dimensions` is zero, or
    /// [`RagError::DimensionMismatch`] for the first chunk whose
    /// embedding does not match.
    pub fn build(meta: IndexMeta, entries: Vec<Chunk>) -> Result<Self> {
        if meta.dimensions == 0 {
            return Err(RagError::Config("index dimensions must be greater than zero".to_string()));
        }
        for chunk in &entries {
            if chunk.embedding.len() != meta.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: meta.dimensions,
                    actual: chunk.embedding.len(),
                });
            }
        }
        debug!(entries = entries.len(), dimensions = meta.dimensions, "built flat index");
        Ok(Self { meta, entries })
    }

    /// Return the index header.
    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search for the `top_k` entries most similar to `query`.
    ///
    /// Entries are ordered by raw cosine similarity descending; ties keep
    /// insertion order (stable sort). The reported score is the cosine
    /// clamped into `[0, 1]` — a negative cosine reports as 0. An empty
    /// index returns an empty list, never an error, and the result never
    /// holds more than `top_k` entries.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<SearchResult> {
        if self.entries.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &Chunk)> = self
            .entries
            .iter()
            .map(|chunk| (cosine_similarity(&chunk.embedding, query), chunk))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(cosine, chunk)| SearchResult { chunk: chunk.clone(), score: cosine.max(0.0) })
            .collect()
    }

    /// Serialize the index to `path`.
    ///
    /// The artifact is written to a temporary sibling file and atomically
    /// renamed into place, so a concurrent loader never observes a
    /// partially written index. Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] or [`RagError::Serialization`] on failure.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp_path = Path::new(&tmp);

        let file = File::create(tmp_path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        fs::rename(tmp_path, path)?;

        info!(
            path = %path.display(),
            entries = self.entries.len(),
            model = %self.meta.embedding_model_id,
            "persisted index"
        );
        Ok(())
    }

    /// Load an index previously written by [`persist`](FlatIndex::persist).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] / [`RagError::Serialization`] on read
    /// failure, [`RagError::Config`] for an unsupported artifact version,
    /// and [`RagError::DimensionMismatch`] if any stored vector disagrees
    /// with the recorded dimensionality.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let index: FlatIndex = serde_json::from_reader(BufReader::new(file))?;

        if index.meta.format_version != INDEX_FORMAT_VERSION {
            return Err(RagError::Config(format!(
                "unsupported index format version {} (expected {INDEX_FORMAT_VERSION})",
                index.meta.format_version
            )));
        }

        // Re-validate the construction invariant on the untrusted artifact.
        let meta = index.meta;
        let index = Self::build(meta, index.entries)?;

        info!(
            path = %path.display(),
            entries = index.entries.len(),
            model = %index.meta.embedding_model_id,
            "loaded index"
        );
        Ok(index)
    }
}
