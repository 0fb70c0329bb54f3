//! Error types for the `medrag-eval` crate.

use thiserror::Error;

/// Errors that can occur during evaluation.
///
/// Metric-level judge failures are recovered by the evaluator (the
/// metric is reported absent); these variants describe the individual
/// failures.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The judging mechanism was unreachable or failed.
    #[error("Judge error: {message}")]
    Judge {
        /// A description of the failure, preserving the upstream error.
        message: String,
    },

    /// The judge replied with something that does not parse as a score
    /// in `[0, 1]`.
    #[error("Judge returned an unparseable score: {raw:?}")]
    InvalidScore {
        /// The raw judge output.
        raw: String,
    },

    /// An error propagated from the query pipeline during batch
    /// evaluation.
    #[error(transparent)]
    Pipeline(#[from] medrag::RagError),
}

/// A convenience result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;
