//! Content-derived document identifiers.

use sha2::{Digest, Sha256};

/// Number of content characters mixed into the hash.
const CONTENT_PREFIX_CHARS: usize = 500;

/// Length of the emitted hex identifier.
const ID_HEX_CHARS: usize = 12;

/// Derive a stable document ID from its title and a content prefix.
///
/// The same title and content always produce the same ID, so re-running
/// ingestion over an unchanged corpus yields identical document and
/// chunk identifiers.
pub fn document_id(title: &str, content: &str) -> String {
    let prefix_end = content
        .char_indices()
        .nth(CONTENT_PREFIX_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(content.len());

    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b":");
    hasher.update(content[..prefix_end].as_bytes());

    let digest = hasher.finalize();
    let mut id = String::with_capacity(ID_HEX_CHARS);
    for byte in digest.iter().take(ID_HEX_CHARS / 2) {
        id.push_str(&format!("{byte:02x}"));
    }
    id
}
