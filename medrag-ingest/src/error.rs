//! Error types for the `medrag-ingest` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during corpus construction.
///
/// Per-file failures inside a directory walk are recovered (skip and
/// log); these variants surface only for failures that invalidate a
/// whole operation, such as a missing corpus directory or an unwritable
/// corpus file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The corpus directory does not exist or is not a directory.
    #[error("Corpus directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// An I/O failure while reading or writing a corpus file.
    #[error("Corpus I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A corpus file could not be parsed.
    #[error("Corpus parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A convenience result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
