//! Directory loading and corpus persistence tests.

use std::fs;
use std::path::Path;

use medrag_ingest::{IngestError, document_id, load_corpus, load_dir, save_corpus};

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn loads_text_markdown_and_json_documents() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "anemia.txt", "Iron deficiency anemia causes fatigue.");
    write(dir.path(), "notes.md", "# Vitamins\nVitamin D supports bone health.");
    write(
        dir.path(),
        "abstracts.json",
        r#"[
            {"content": "Diabetes management requires glucose monitoring.",
             "title": "Diabetes Care", "source": "Journal", "year": "2021",
             "url": "https://example.org/dm"},
            {"content": "Hypertension responds to dietary sodium reduction.",
             "title": "Hypertension Review"}
        ]"#,
    );

    let outcome = load_dir(dir.path()).unwrap();

    assert_eq!(outcome.documents.len(), 4);
    assert!(outcome.skipped.is_empty());

    let titles: Vec<&str> = outcome.documents.iter().map(|d| d.title.as_str()).collect();
    assert!(titles.contains(&"anemia"));
    assert!(titles.contains(&"notes"));
    assert!(titles.contains(&"Diabetes Care"));

    let diabetes = outcome.documents.iter().find(|d| d.title == "Diabetes Care").unwrap();
    assert_eq!(diabetes.year.as_deref(), Some("2021"));
    assert_eq!(diabetes.url.as_deref(), Some("https://example.org/dm"));
    assert_eq!(diabetes.source, "Journal");
}

#[test]
fn malformed_files_are_skipped_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.txt", "The liver metabolizes most drugs.");
    write(dir.path(), "broken.json", "{ not valid json at all");
    write(dir.path(), "empty.txt", "   \n  ");

    let outcome = load_dir(dir.path()).unwrap();

    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.documents[0].title, "good");
    assert_eq!(outcome.skipped.len(), 2);
}

#[test]
fn empty_json_records_are_skipped_individually() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "records.json",
        r#"[
            {"content": "", "title": "Empty"},
            {"content": "Aspirin inhibits platelet aggregation.", "title": "Aspirin"}
        ]"#,
    );

    let outcome = load_dir(dir.path()).unwrap();

    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.documents[0].title, "Aspirin");
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].reason.contains("record 0"));
}

#[test]
fn unsupported_extensions_are_ignored_silently() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "image.png", "not a document");
    write(dir.path(), "readme.txt", "Actual text content.");

    let outcome = load_dir(dir.path()).unwrap();

    assert_eq!(outcome.documents.len(), 1);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = load_dir(&missing).unwrap_err();
    assert!(matches!(err, IngestError::MissingDirectory(_)));
}

#[test]
fn corpus_round_trip_preserves_documents() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "doc.txt", "Antibiotics treat bacterial infections.");
    let outcome = load_dir(dir.path()).unwrap();

    let corpus_path = dir.path().join("processed").join("corpus.json");
    save_corpus(&corpus_path, &outcome.documents).unwrap();

    let reloaded = load_corpus(&corpus_path).unwrap();
    assert_eq!(reloaded, outcome.documents);
}

#[test]
fn document_ids_are_stable_and_content_derived() {
    let id1 = document_id("Title", "content body");
    let id2 = document_id("Title", "content body");
    let id3 = document_id("Other", "content body");

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
    assert_eq!(id1.len(), 12);
    assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
}
