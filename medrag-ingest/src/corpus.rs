//! Corpus persistence.
//!
//! A corpus file is a single JSON artifact holding the assembled
//! document set plus the timestamp it was processed at. Saving uses the
//! same write-then-rename discipline as the index artifact, so a reader
//! never observes a half-written corpus.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use medrag::Document;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// The persisted corpus artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusFile {
    /// When the corpus was assembled.
    pub processed_at: DateTime<Utc>,
    /// The documents in ingestion order.
    pub documents: Vec<Document>,
}

/// Save `documents` as a corpus file at `path`.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns [`IngestError::Io`](crate::IngestError::Io) or
/// [`IngestError::Parse`](crate::IngestError::Parse) on failure.
pub fn save_corpus(path: &Path, documents: &[Document]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let corpus = CorpusFile { processed_at: Utc::now(), documents: documents.to_vec() };

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = Path::new(&tmp);

    let file = File::create(tmp_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &corpus)?;
    fs::rename(tmp_path, path)?;

    info!(path = %path.display(), documents = documents.len(), "saved corpus");
    Ok(())
}

/// Load a corpus file previously written by [`save_corpus`].
///
/// # Errors
///
/// Returns [`IngestError::Io`](crate::IngestError::Io) if the file is
/// missing or unreadable, [`IngestError::Parse`](crate::IngestError::Parse)
/// if it does not parse.
pub fn load_corpus(path: &Path) -> Result<Vec<Document>> {
    let file = File::open(path)?;
    let corpus: CorpusFile = serde_json::from_reader(BufReader::new(file))?;

    info!(
        path = %path.display(),
        documents = corpus.documents.len(),
        processed_at = %corpus.processed_at,
        "loaded corpus"
    );
    Ok(corpus.documents)
}
