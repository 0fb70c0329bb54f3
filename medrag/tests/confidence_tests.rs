//! Confidence scorer tests.

use std::collections::HashMap;

use medrag::ConfidenceScorer;
use medrag::document::{Chunk, SearchResult};

fn results(scores: &[f32]) -> Vec<SearchResult> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| SearchResult {
            chunk: Chunk {
                id: format!("c{i}"),
                text: String::new(),
                chunk_index: i,
                document_id: "doc".to_string(),
                embedding: Vec::new(),
                metadata: HashMap::new(),
            },
            score,
        })
        .collect()
}

#[test]
fn empty_retrieval_scores_exactly_zero() {
    assert_eq!(ConfidenceScorer::default().score(&[]), 0.0);
}

#[test]
fn single_result_scores_its_similarity() {
    let score = ConfidenceScorer::default().score(&results(&[0.8]));
    assert!((score - 0.8).abs() < 1e-6);
}

#[test]
fn higher_top_similarity_raises_confidence() {
    let scorer = ConfidenceScorer::default();
    let low = scorer.score(&results(&[0.5, 0.4]));
    let high = scorer.score(&results(&[0.9, 0.4]));
    assert!(high > low);
}

#[test]
fn tighter_clustering_raises_confidence() {
    let scorer = ConfidenceScorer::default();
    let spread = scorer.score(&results(&[0.9, 0.1]));
    let clustered = scorer.score(&results(&[0.9, 0.9]));
    assert!(clustered > spread);
}

#[test]
fn confidence_stays_within_unit_interval() {
    let scorer = ConfidenceScorer::new(0.7);
    for scores in [&[1.0f32, 1.0][..], &[0.0, 0.0], &[1.0], &[0.3, 0.9, 0.6]] {
        let c = scorer.score(&results(scores));
        assert!((0.0..=1.0).contains(&c), "confidence {c} out of range");
    }
}
