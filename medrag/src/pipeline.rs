//! Query pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the query workflow by composing an
//! [`Embedder`], a [`Generator`], and a loaded [`FlatIndex`]. The index
//! is immutable during serving and shared read-only across concurrent
//! queries; re-ingestion builds a fresh index and a fresh pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medrag::{FlatIndex, PipelineConfig, RagPipeline};
//!
//! let index = Arc::new(FlatIndex::load(Path::new("data/index.json"))?);
//! let pipeline = RagPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(embedder))
//!     .generator(Arc::new(generator))
//!     .index(index)
//!     .build()?;
//!
//! let response = pipeline.query("What are the symptoms of anemia?").await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::confidence::ConfidenceScorer;
use crate::document::{AnswerResponse, SearchResult, Source};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::generation::{GenerationOptions, Generator};
use crate::index::FlatIndex;
use crate::prompt::{
    GENERAL_WARNING, INSUFFICIENT_CONTEXT_WARNING, PromptAssembler, REFUSAL_ANSWER,
};
use crate::retry::with_transient_retry;

/// Warning attached to degraded responses (generation failed, sources
/// still returned).
pub const DEGRADED_WARNING: &str =
    "Answer generation failed; only the retrieved sources are shown.";

/// Body of a degraded response.
const DEGRADED_ANSWER: &str = "The answer could not be generated. The most relevant retrieved \
     excerpts are listed under sources.";

/// The query pipeline orchestrator.
///
/// The query path is a linear pipeline with one branch point: an empty or
/// low-confidence retrieval routes to a fixed refusal answer and the
/// generator is never invoked. Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: PipelineConfig,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    index: Arc<FlatIndex>,
    assembler: PromptAssembler,
    scorer: ConfidenceScorer,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Return a reference to the loaded index.
    pub fn index(&self) -> &Arc<FlatIndex> {
        &self.index
    }

    /// Retrieve context for a question: embed → search → filter.
    ///
    /// Fails fast with [`RagError::IndexVersionMismatch`] when the
    /// embedder's model identifier differs from the one recorded in the
    /// index — similarity scores across embedding models are garbage.
    /// Candidates scoring below `similarity_floor` are dropped; an empty
    /// result is a valid state, not an error (it triggers the refusal
    /// path in [`query`](RagPipeline::query)).
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let index_model = &self.index.meta().embedding_model_id;
        if self.embedder.model_id() != index_model {
            error!(
                index_model = %index_model,
                query_model = %self.embedder.model_id(),
                "embedding model mismatch"
            );
            return Err(RagError::IndexVersionMismatch {
                index_model: index_model.clone(),
                query_model: self.embedder.model_id().to_string(),
            });
        }

        // 1. Embed the question, retrying once on transient failure
        let query_embedding =
            with_transient_retry("embed_query", || self.embedder.embed(question)).await.map_err(
                |e| {
                    error!(error = %e, "embedding failed during query");
                    e
                },
            )?;

        // 2. Search the index
        let candidates = self.index.search(&query_embedding, self.config.top_k);

        // 3. Filter by the similarity floor
        let floor = self.config.similarity_floor;
        let candidate_count = candidates.len();
        let retained: Vec<SearchResult> =
            candidates.into_iter().filter(|r| r.score >= floor).collect();

        info!(
            candidates = candidate_count,
            retained = retained.len(),
            floor,
            "retrieval completed"
        );
        Ok(retained)
    }

    /// Answer a question through the full pipeline.
    ///
    /// Retrieval → confidence check → prompt assembly → generation →
    /// response. Empty or low-confidence retrieval returns the fixed
    /// refusal answer with confidence 0 and never calls the generator.
    ///
    /// # Errors
    ///
    /// Surfaces embedding and generation failures with enough detail to
    /// distinguish retriable from fatal, unless
    /// `degraded_on_generation_failure` is configured, in which case a
    /// permanent generation failure yields a degraded response carrying
    /// the retrieved sources.
    pub async fn query(&self, question: &str) -> Result<AnswerResponse> {
        let total_start = Instant::now();

        // Retrieval phase
        let retrieval_start = Instant::now();
        let retrieved = self.retrieve(question).await?;
        let retrieval_time_ms = elapsed_ms(retrieval_start);

        let confidence = self.scorer.score(&retrieved);

        // The single branch point: refuse rather than generate from
        // insufficient evidence.
        if retrieved.is_empty() || confidence < self.config.answer_floor {
            info!(confidence, "insufficient retrieval support, returning refusal");
            return Ok(AnswerResponse {
                question: question.to_string(),
                answer: REFUSAL_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
                retrieval_time_ms,
                generation_time_ms: 0.0,
                total_time_ms: elapsed_ms(total_start),
                warning: Some(INSUFFICIENT_CONTEXT_WARNING.to_string()),
            });
        }

        let sources = self.build_sources(&retrieved);
        let prompt = self.assembler.assemble(question, &retrieved);
        let options = GenerationOptions {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        // Generation phase
        let generation_start = Instant::now();
        let generated =
            with_transient_retry("generate", || self.generator.generate(&prompt, &options)).await;
        let generation_time_ms = elapsed_ms(generation_start);

        let answer = match generated {
            Ok(text) => text,
            Err(e) if self.config.degraded_on_generation_failure => {
                warn!(error = %e, "generation failed, returning degraded response");
                return Ok(AnswerResponse {
                    question: question.to_string(),
                    answer: DEGRADED_ANSWER.to_string(),
                    sources,
                    confidence,
                    retrieval_time_ms,
                    generation_time_ms,
                    total_time_ms: elapsed_ms(total_start),
                    warning: Some(DEGRADED_WARNING.to_string()),
                });
            }
            Err(e) => {
                error!(error = %e, "generation failed");
                return Err(e);
            }
        };

        let answer = append_disclaimer(answer);

        info!(
            sources = sources.len(),
            confidence,
            retrieval_time_ms,
            generation_time_ms,
            "query completed"
        );

        Ok(AnswerResponse {
            question: question.to_string(),
            answer,
            sources,
            confidence,
            retrieval_time_ms,
            generation_time_ms,
            total_time_ms: elapsed_ms(total_start),
            warning: Some(GENERAL_WARNING.to_string()),
        })
    }

    /// Build the citation source list from the retained retrieval results.
    ///
    /// Labels are positional (`DOC_1`, `DOC_2`, ...) matching the block
    /// numbers the prompt assembler hands to the generator.
    fn build_sources(&self, retrieved: &[SearchResult]) -> Vec<Source> {
        retrieved
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let chunk = &result.chunk;
                Source {
                    doc_id: format!("DOC_{}", i + 1),
                    chunk_id: chunk.id.clone(),
                    title: chunk
                        .metadata
                        .get("title")
                        .cloned()
                        .unwrap_or_else(|| chunk.document_id.clone()),
                    year: chunk.metadata.get("year").cloned(),
                    url: chunk.metadata.get("url").cloned(),
                    relevance_score: result.score,
                    excerpt: truncate_excerpt(&chunk.text, self.config.excerpt_chars),
                }
            })
            .collect()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Append the medical disclaimer unless the generator already included one.
fn append_disclaimer(answer: String) -> String {
    if answer.to_lowercase().contains("educational purposes") {
        answer
    } else {
        format!("{answer}\n\n{}", crate::prompt::MEDICAL_DISCLAIMER)
    }
}

/// Truncate `text` to `max_chars` characters, appending an ellipsis when
/// anything was cut. Never splits a code point.
fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. Call [`build()`](RagPipelineBuilder::build)
/// to validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    generator: Option<Arc<dyn Generator>>,
    index: Option<Arc<FlatIndex>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedder.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the generator.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the loaded index to serve queries from.
    pub fn index(mut self, index: Arc<FlatIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::Config("generator is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;

        let assembler = PromptAssembler::new(config.max_context_chars);
        let scorer = ConfidenceScorer::new(config.confidence_top_weight);

        Ok(RagPipeline { config, embedder, generator, index, assembler, scorer })
    }
}
