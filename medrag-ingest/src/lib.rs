//! # medrag-ingest
//!
//! Corpus construction for [`medrag`]: loading source documents from
//! local files and persisting the assembled corpus.
//!
//! Loading is best-effort — corpus construction should survive one bad
//! file. Unreadable or malformed files are skipped with a warning and
//! reported in the [`LoadOutcome`], never aborting the rest of the walk.
//!
//! ```rust,ignore
//! use medrag_ingest::{load_dir, save_corpus};
//!
//! let outcome = load_dir(Path::new("data/raw_documents"))?;
//! for skipped in &outcome.skipped {
//!     eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
//! }
//! save_corpus(Path::new("data/processed/corpus.json"), &outcome.documents)?;
//! ```

pub mod corpus;
pub mod error;
pub mod id;
pub mod loader;

pub use corpus::{CorpusFile, load_corpus, save_corpus};
pub use error::{IngestError, Result};
pub use id::document_id;
pub use loader::{LoadOutcome, SkippedFile, load_dir};
