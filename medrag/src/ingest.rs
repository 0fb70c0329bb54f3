//! Index construction: chunk → embed → index.
//!
//! Ingestion is an exclusive phase, distinct from query serving: the
//! index is built in full (and optionally persisted with an atomic
//! rename) before any reader loads it. Corpus construction is
//! best-effort — a document that cannot be embedded is skipped and
//! logged, never aborting the batch.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chunking::Chunker;
use crate::config::IngestConfig;
use crate::document::{Chunk, Document};
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::{FlatIndex, INDEX_FORMAT_VERSION, IndexMeta};
use crate::retry::with_transient_retry;

/// A document dropped from an ingestion run, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDocument {
    /// ID of the skipped document.
    pub document_id: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Summary of an ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Documents that contributed chunks to the index.
    pub documents_indexed: usize,
    /// Total chunks indexed across all documents.
    pub chunks_indexed: usize,
    /// Documents dropped with their failure reasons.
    pub skipped: Vec<SkippedDocument>,
}

/// Builds a [`FlatIndex`] from source documents.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use medrag::{FixedSizeChunker, IndexBuilder, IngestConfig, MockEmbedder};
///
/// let config = IngestConfig::new(500, 50)?;
/// let builder = IndexBuilder::new(
///     Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)),
///     Arc::new(MockEmbedder::new(256)),
///     config,
/// );
/// let (index, report) = builder.build(&documents).await?;
/// ```
pub struct IndexBuilder {
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    config: IngestConfig,
}

impl IndexBuilder {
    /// Create a builder from a chunker, an embedder, and chunking
    /// parameters. The parameters are recorded in the built index's
    /// header; pass the same values the chunker was constructed with.
    pub fn new(chunker: Arc<dyn Chunker>, embedder: Arc<dyn Embedder>, config: IngestConfig) -> Self {
        Self { chunker, embedder, config }
    }

    /// Build an index over `documents`.
    ///
    /// Each document is chunked and its chunks embedded in one batch,
    /// with a single backoff retry on transient embedding failures. A
    /// document that fails permanently is recorded in the report and the
    /// run continues; an all-failed batch still yields a valid empty
    /// index.
    ///
    /// # Errors
    ///
    /// Returns an error only for defects that invalidate the whole index,
    /// such as an embedder producing vectors of the wrong dimensionality.
    pub async fn build(&self, documents: &[Document]) -> Result<(FlatIndex, IngestReport)> {
        let mut entries: Vec<Chunk> = Vec::new();
        let mut report = IngestReport::default();

        for document in documents {
            match self.ingest_document(document).await {
                Ok(chunks) => {
                    info!(document.id = %document.id, chunk_count = chunks.len(), "ingested document");
                    report.documents_indexed += 1;
                    report.chunks_indexed += chunks.len();
                    entries.extend(chunks);
                }
                Err(e) => {
                    warn!(document.id = %document.id, error = %e, "skipping document");
                    report
                        .skipped
                        .push(SkippedDocument { document_id: document.id.clone(), reason: e.to_string() });
                }
            }
        }

        let meta = IndexMeta {
            format_version: INDEX_FORMAT_VERSION,
            embedding_model_id: self.embedder.model_id().to_string(),
            dimensions: self.embedder.dimensions(),
            chunk_size: self.config.chunk_size,
            chunk_overlap: self.config.chunk_overlap,
        };
        let index = FlatIndex::build(meta, entries)?;

        info!(
            documents = report.documents_indexed,
            chunks = report.chunks_indexed,
            skipped = report.skipped.len(),
            "ingestion completed"
        );
        Ok((index, report))
    }

    /// Build an index over `documents` and persist it to `path`.
    ///
    /// Persistence uses the write-then-atomic-rename discipline: the
    /// artifact at `path` is only ever a complete index.
    pub async fn build_and_persist(&self, documents: &[Document], path: &Path) -> Result<IngestReport> {
        let (index, report) = self.build(documents).await?;
        index.persist(path)?;
        Ok(report)
    }

    /// Chunk one document and embed its chunks.
    async fn ingest_document(&self, document: &Document) -> Result<Vec<Chunk>> {
        // 1. Chunk the document
        let mut chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            return Ok(chunks);
        }

        // 2. Collect chunk texts for batch embedding
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

        // 3. Generate embeddings, retrying once on transient failure
        let embeddings =
            with_transient_retry("embed_batch", || self.embedder.embed_batch(&texts)).await?;

        if embeddings.len() != chunks.len() {
            return Err(crate::error::RagError::Pipeline(format!(
                "embedder returned {} vectors for {} chunks of document '{}'",
                embeddings.len(),
                chunks.len(),
                document.id
            )));
        }

        // 4. Attach embeddings to chunks
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        Ok(chunks)
    }
}
