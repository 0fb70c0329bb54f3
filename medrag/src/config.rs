//! Configuration for ingestion and query serving.
//!
//! Configuration is passed explicitly into constructors; nothing in the
//! pipeline reads ambient environment state. The retrieval thresholds and
//! the confidence weighting are empirically tuned per embedding model and
//! corpus — treat the defaults as starting points, not constants.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the query pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Number of top candidates to request from vector search.
    pub top_k: usize,
    /// Minimum similarity score for a retrieved candidate; candidates
    /// below the floor are dropped. Too low admits irrelevant passages
    /// that the generator may cite spuriously; too high starves the
    /// generator of context on valid questions.
    pub similarity_floor: f32,
    /// Minimum confidence below which the answer is suppressed and the
    /// fixed refusal is returned instead.
    pub answer_floor: f32,
    /// Weight of the top similarity in the confidence blend; the
    /// remainder weights the mean of the retained set.
    pub confidence_top_weight: f32,
    /// Sampling temperature passed to the generator. Kept near 0 for
    /// this domain to reduce answer variance.
    pub temperature: f32,
    /// Maximum tokens the generator may produce.
    pub max_tokens: u32,
    /// Maximum size of the assembled context, in characters. Lowest-ranked
    /// blocks are dropped whole when the budget is exceeded.
    pub max_context_chars: usize,
    /// Length of source excerpts in characters.
    pub excerpt_chars: usize,
    /// When set, a permanent generation failure returns a degraded
    /// response carrying the retrieved sources instead of an error.
    pub degraded_on_generation_failure: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_floor: 0.3,
            answer_floor: 0.25,
            confidence_top_weight: 0.7,
            temperature: 0.1,
            max_tokens: 1000,
            max_context_chars: 8000,
            excerpt_chars: 200,
            degraded_on_generation_failure: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the number of top candidates to request from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity score for retrieved candidates.
    pub fn similarity_floor(mut self, floor: f32) -> Self {
        self.config.similarity_floor = floor;
        self
    }

    /// Set the confidence floor below which answers are suppressed.
    pub fn answer_floor(mut self, floor: f32) -> Self {
        self.config.answer_floor = floor;
        self
    }

    /// Set the weight of the top similarity in the confidence blend.
    pub fn confidence_top_weight(mut self, weight: f32) -> Self {
        self.config.confidence_top_weight = weight;
        self
    }

    /// Set the generator sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the maximum tokens the generator may produce.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the assembled-context character budget.
    pub fn max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Set the source excerpt length in characters.
    pub fn excerpt_chars(mut self, chars: usize) -> Self {
        self.config.excerpt_chars = chars;
        self
    }

    /// Allow degraded responses on permanent generation failure.
    pub fn degraded_on_generation_failure(mut self, allow: bool) -> Self {
        self.config.degraded_on_generation_failure = allow;
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `top_k == 0`
    /// - `similarity_floor`, `answer_floor`, or `confidence_top_weight`
    ///   is outside `[0, 1]`
    /// - `max_context_chars == 0`
    pub fn build(self) -> Result<PipelineConfig> {
        let c = &self.config;
        if c.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        for (name, value) in [
            ("similarity_floor", c.similarity_floor),
            ("answer_floor", c.answer_floor),
            ("confidence_top_weight", c.confidence_top_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RagError::Config(format!(
                    "{name} ({value}) must be within [0, 1]"
                )));
            }
        }
        if c.max_context_chars == 0 {
            return Err(RagError::Config(
                "max_context_chars must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

/// Chunking parameters used when building an index.
///
/// Recorded in the persisted artifact so the parameters that produced an
/// index are always recoverable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { chunk_size: 500, chunk_overlap: 50 }
    }
}

impl IngestConfig {
    /// Create an [`IngestConfig`], validating that `chunk_overlap` is
    /// strictly less than `chunk_size` and that `chunk_size` is nonzero.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] on inconsistent parameters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }
}
