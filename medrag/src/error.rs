//! Error types for the `medrag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval-augmented generation operations.
///
/// Adapter failures carry a `transient` flag distinguishing retriable
/// conditions (network errors, rate limits, upstream 5xx) from permanent
/// ones (malformed input, authentication). Callers on the critical path
/// retry transient failures once with backoff and surface the rest.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
        /// Whether the failure is worth retrying.
        transient: bool,
    },

    /// An error occurred during answer generation.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure, preserving the upstream error.
        message: String,
        /// Whether the failure is worth retrying.
        transient: bool,
    },

    /// The query-time embedding model differs from the model recorded in
    /// the persisted index. Fatal for the query: similarity scores across
    /// embedding models are meaningless.
    #[error("Index built with embedding model '{index_model}' but query uses '{query_model}'")]
    IndexVersionMismatch {
        /// Model identifier recorded in the index artifact.
        index_model: String,
        /// Model identifier of the embedder issuing the query.
        query_model: String,
    },

    /// An embedding's dimensionality does not match the index.
    #[error("Embedding dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality the index was declared with.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// An I/O error while persisting or loading an index artifact.
    #[error("Index I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization error while persisting or loading an index artifact.
    #[error("Index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RagError {
    /// Whether this error is a transient adapter failure that callers may
    /// retry with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Embedding { transient: true, .. } | Self::Generation { transient: true, .. }
        )
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
