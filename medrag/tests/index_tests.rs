//! Flat index construction, search ordering, and persistence tests.

use std::collections::HashMap;

use medrag::document::Chunk;
use medrag::error::RagError;
use medrag::index::{FlatIndex, INDEX_FORMAT_VERSION, IndexMeta};
use proptest::prelude::*;

fn meta(dimensions: usize) -> IndexMeta {
    IndexMeta {
        format_version: INDEX_FORMAT_VERSION,
        embedding_model_id: "mock-embedder".to_string(),
        dimensions,
        chunk_size: 500,
        chunk_overlap: 50,
    }
}

fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: format!("text of {id}"),
        chunk_index: 0,
        document_id: format!("doc-{id}"),
        embedding,
        metadata: HashMap::new(),
    }
}

/// One-hot unit vector of dimension `dim` with a 1 at `at`.
fn one_hot(dim: usize, at: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[at] = 1.0;
    v
}

#[test]
fn build_rejects_wrong_dimensionality() {
    let chunks = vec![chunk("a", one_hot(4, 0)), chunk("b", vec![1.0, 0.0])];
    let err = FlatIndex::build(meta(4), chunks).unwrap_err();

    assert!(matches!(err, RagError::DimensionMismatch { expected: 4, actual: 2 }));
}

#[test]
fn empty_index_search_returns_empty() {
    let index = FlatIndex::build(meta(4), Vec::new()).unwrap();
    assert!(index.is_empty());
    assert!(index.search(&one_hot(4, 0), 5).is_empty());
}

#[test]
fn search_returns_most_similar_first() {
    let chunks = vec![
        chunk("a", vec![1.0, 0.0, 0.0, 0.0]),
        chunk("b", vec![0.8, 0.6, 0.0, 0.0]),
        chunk("c", vec![0.0, 1.0, 0.0, 0.0]),
    ];
    let index = FlatIndex::build(meta(4), chunks).unwrap();

    let results = index.search(&one_hot(4, 0), 3);
    let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert!((results[0].score - 1.0).abs() < 1e-6);
    assert!((results[1].score - 0.8).abs() < 1e-6);
}

#[test]
fn negative_cosine_clamps_to_zero_score() {
    let chunks = vec![chunk("opposite", vec![-1.0, 0.0])];
    let index = FlatIndex::build(meta(2), chunks).unwrap();

    let results = index.search(&[1.0, 0.0], 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 0.0);
}

#[test]
fn ties_keep_insertion_order() {
    let shared = vec![0.0, 1.0, 0.0];
    let chunks = vec![
        chunk("first", shared.clone()),
        chunk("second", shared.clone()),
        chunk("third", shared.clone()),
    ];
    let index = FlatIndex::build(meta(3), chunks).unwrap();

    let results = index.search(&[0.0, 1.0, 0.0], 3);
    let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, ["first", "second", "third"]);
}

#[test]
fn persist_load_round_trip_preserves_search() {
    let dim = 8;
    let chunks: Vec<Chunk> =
        (0..dim).map(|i| chunk(&format!("c{i}"), one_hot(dim, i))).collect();
    let index = FlatIndex::build(meta(dim), chunks.clone()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    index.persist(&path).unwrap();

    let loaded = FlatIndex::load(&path).unwrap();
    assert_eq!(loaded.meta(), index.meta());
    assert_eq!(loaded.len(), index.len());

    // Every chunk retrieves itself as its own top-1 neighbor.
    for original in &chunks {
        let results = loaded.search(&original.embedding, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, original.id);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }
}

#[test]
fn persist_leaves_no_temporary_file() {
    let index = FlatIndex::build(meta(2), vec![chunk("a", vec![1.0, 0.0])]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("index.json");
    index.persist(&path).unwrap();

    assert!(path.exists());
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    assert!(!std::path::Path::new(&tmp).exists());
}

#[test]
fn load_rejects_unsupported_format_version() {
    let artifact = serde_json::json!({
        "meta": {
            "format_version": INDEX_FORMAT_VERSION + 1,
            "embedding_model_id": "mock-embedder",
            "dimensions": 2,
            "chunk_size": 500,
            "chunk_overlap": 50,
        },
        "entries": [],
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    std::fs::write(&path, artifact.to_string()).unwrap();

    let err = FlatIndex::load(&path).unwrap_err();
    assert!(matches!(err, RagError::Config(_)));
}

// ── Property tests ─────────────────────────────────────────────────

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// Generate a chunk with a normalized embedding.
fn arb_chunk(dim: usize) -> impl Strategy<Value = Chunk> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| Chunk {
            id,
            text,
            chunk_index: 0,
            document_id: "doc_1".to_string(),
            embedding,
            metadata: HashMap::new(),
        },
    )
}

const DIM: usize = 16;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of embedded chunks, search returns results ordered by
    /// descending score, bounded by both `top_k` and the index size.
    #[test]
    fn results_ordered_descending_and_bounded_by_top_k(
        chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        top_k in 1usize..25,
    ) {
        let count = chunks.len();
        let index = FlatIndex::build(meta(DIM), chunks).unwrap();
        let results = index.search(&query, top_k);

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= count);

        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }

    /// Raising the similarity floor never increases the number of
    /// retained results for a fixed query and index.
    #[test]
    fn floor_filtering_is_monotone(
        chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        (low, high) in (0.0f32..1.0, 0.0f32..1.0),
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let index = FlatIndex::build(meta(DIM), chunks).unwrap();
        let results = index.search(&query, 20);

        let at_low = results.iter().filter(|r| r.score >= low).count();
        let at_high = results.iter().filter(|r| r.score >= high).count();
        prop_assert!(at_high <= at_low);
    }
}
