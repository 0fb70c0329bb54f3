//! Best-effort document loading from local directories.
//!
//! `.txt` and `.md` files load as whole-text documents titled by their
//! file stem. `.json` files hold arrays of structured records with
//! `content`, `title`, and optional `source` / `year` / `url` /
//! `metadata` fields. A file that cannot be read or parsed is skipped
//! and logged; one bad file never aborts the walk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use medrag::Document;
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{IngestError, Result};
use crate::id::document_id;

/// A file or record dropped during loading, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Path of the offending file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// The outcome of a directory load: the documents that could be built
/// plus everything that was skipped.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Successfully loaded documents, in walk order.
    pub documents: Vec<Document>,
    /// Files and records dropped with their failure reasons.
    pub skipped: Vec<SkippedFile>,
}

/// A structured document record inside a `.json` corpus file.
#[derive(Debug, Deserialize)]
struct DocumentRecord {
    content: String,
    title: Option<String>,
    source: Option<String>,
    year: Option<String>,
    url: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// Load every supported document under `dir`, recursively.
///
/// # Errors
///
/// Returns [`IngestError::MissingDirectory`] when `dir` does not exist;
/// everything below that is recovered per file and reported in the
/// returned [`LoadOutcome`].
pub fn load_dir(dir: &Path) -> Result<LoadOutcome> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDirectory(dir.to_path_buf()));
    }

    let mut outcome = LoadOutcome::default();

    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                outcome.skipped.push(SkippedFile { path, reason: e.to_string() });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let extension =
            path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("txt") | Some("md") => match load_text_document(path) {
                Ok(document) => outcome.documents.push(document),
                Err(reason) => {
                    warn!(path = %path.display(), %reason, "skipping file");
                    outcome.skipped.push(SkippedFile { path: path.to_path_buf(), reason });
                }
            },
            Some("json") => load_json_documents(path, &mut outcome),
            _ => {}
        }
    }

    info!(
        documents = outcome.documents.len(),
        skipped = outcome.skipped.len(),
        dir = %dir.display(),
        "corpus directory loaded"
    );
    Ok(outcome)
}

/// Load a whole-text document from a `.txt` / `.md` file.
fn load_text_document(path: &Path) -> std::result::Result<Document, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    if content.trim().is_empty() {
        return Err("file contains no text".to_string());
    }

    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string();
    let source = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let mut document = Document::new(document_id(&title, &content), title, content, source);
    document
        .metadata
        .insert("file_path".to_string(), path.display().to_string());
    Ok(document)
}

/// Load structured records from a `.json` file into `outcome`.
///
/// A parse failure skips the whole file; an invalid record (empty
/// content) skips just that record.
fn load_json_documents(path: &Path, outcome: &mut LoadOutcome) {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping file");
            outcome.skipped.push(SkippedFile { path: path.to_path_buf(), reason: e.to_string() });
            return;
        }
    };

    let records: Vec<DocumentRecord> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping malformed json file");
            outcome.skipped.push(SkippedFile { path: path.to_path_buf(), reason: e.to_string() });
            return;
        }
    };

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("untitled");
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");

    for (i, record) in records.into_iter().enumerate() {
        if record.content.trim().is_empty() {
            warn!(path = %path.display(), record = i, "skipping record with empty content");
            outcome.skipped.push(SkippedFile {
                path: path.to_path_buf(),
                reason: format!("record {i} has empty content"),
            });
            continue;
        }

        let title = record.title.unwrap_or_else(|| format!("{stem} #{i}"));
        let mut document = Document::new(
            document_id(&title, &record.content),
            title,
            record.content,
            record.source.unwrap_or_else(|| file_name.to_string()),
        );
        document.year = record.year;
        document.url = record.url;
        document.metadata = record.metadata;
        outcome.documents.push(document);
    }
}
