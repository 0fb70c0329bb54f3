//! # medrag
//!
//! Citation-grounded retrieval-augmented question answering over medical
//! document corpora.
//!
//! ## Overview
//!
//! The crate is a thin layer over a vector index and hosted model calls:
//!
//! - [`Chunker`] implementations split documents into overlapping passages
//! - [`Embedder`] wraps an external sentence-embedding model
//! - [`FlatIndex`] stores embedded chunks and answers cosine nearest-neighbor
//!   queries; it persists to a single JSON artifact and loads back without
//!   re-embedding
//! - [`IndexBuilder`] runs the chunk → embed → index ingestion phase
//! - [`PromptAssembler`] renders retrieved passages into numbered
//!   `[DOC_i]` context blocks under a fixed instruction
//! - [`Generator`] wraps an external text-generation model
//! - [`ConfidenceScorer`] summarizes retrieval quality as a `[0, 1]` scalar
//! - [`RagPipeline`] wires it together: retrieve → refuse-or-generate →
//!   cite
//!
//! Answers are grounded, not verified: every stated claim is traceable to
//! a retrieved passage via its citation marker, but factual correctness
//! is not guaranteed. When retrieval support is missing or weak, the
//! pipeline returns a fixed refusal instead of generating.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medrag::{
//!     Document, FixedSizeChunker, IndexBuilder, IngestConfig, MockEmbedder,
//!     MockGenerator, PipelineConfig, RagPipeline,
//! };
//!
//! // Ingestion phase (exclusive): chunk, embed, index, persist.
//! let config = IngestConfig::default();
//! let embedder = Arc::new(MockEmbedder::new(256));
//! let builder = IndexBuilder::new(
//!     Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)),
//!     embedder.clone(),
//!     config,
//! );
//! let (index, report) = builder.build(&documents).await?;
//!
//! // Serving phase: the index is immutable and shared.
//! let pipeline = RagPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(embedder)
//!     .generator(Arc::new(MockGenerator::new("…")))
//!     .index(Arc::new(index))
//!     .build()?;
//!
//! let response = pipeline.query("What causes iron deficiency?").await?;
//! println!("{} (confidence {:.2})", response.answer, response.confidence);
//! ```
//!
//! ## Features
//!
//! | Feature | Adapters |
//! |---------|----------|
//! | `openai` | [`openai::OpenAiEmbedder`], [`openai::OpenAiGenerator`] |
//! | `gemini` | [`gemini::GeminiGenerator`] |
//!
//! The mock adapters are always available and deterministic, so the whole
//! pipeline is testable without network access or process-wide setup.

pub mod chunking;
pub mod config;
pub mod confidence;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod generation;
pub mod index;
pub mod ingest;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
mod retry;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::{IngestConfig, PipelineConfig, PipelineConfigBuilder};
pub use confidence::ConfidenceScorer;
pub use document::{AnswerResponse, Chunk, Document, SearchResult, Source};
pub use embedding::Embedder;
pub use error::{RagError, Result};
pub use generation::{GenerationOptions, Generator};
pub use index::{FlatIndex, INDEX_FORMAT_VERSION, IndexMeta};
pub use ingest::{IndexBuilder, IngestReport, SkippedDocument};
pub use mock::{MockEmbedder, MockGenerator};
pub use pipeline::{DEGRADED_WARNING, RagPipeline, RagPipelineBuilder};
pub use prompt::{
    INSUFFICIENT_CONTEXT_WARNING, MEDICAL_DISCLAIMER, PromptAssembler, REFUSAL_ANSWER,
    cited_indices,
};
