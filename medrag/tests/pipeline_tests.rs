//! End-to-end pipeline tests: retrieval, refusal, citations, retries.

use std::sync::Arc;

use medrag::{
    Document, FixedSizeChunker, FlatIndex, IndexBuilder, IngestConfig, MockEmbedder,
    MockGenerator, PipelineConfig, RagError, RagPipeline, cited_indices,
    prompt::REFUSAL_ANSWER,
};

const DIM: usize = 512;

fn doc(id: &str, title: &str, text: &str) -> Document {
    Document::new(id, title, text, "unit-test")
}

fn vitamin_docs() -> Vec<Document> {
    vec![
        doc("doc-a", "Vitamin D", "Vitamin D deficiency causes fatigue and bone pain."),
        doc("doc-b", "Diabetes", "Diabetes symptoms include thirst and frequent urination."),
    ]
}

async fn build_index(documents: &[Document], embedder: Arc<MockEmbedder>) -> FlatIndex {
    let config = IngestConfig::new(500, 50).unwrap();
    let builder = IndexBuilder::new(
        Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)),
        embedder,
        config,
    );
    let (index, report) = builder.build(documents).await.unwrap();
    assert!(report.skipped.is_empty());
    index
}

fn pipeline_with(
    index: FlatIndex,
    embedder: Arc<MockEmbedder>,
    generator: Arc<MockGenerator>,
    config: PipelineConfig,
) -> RagPipeline {
    RagPipeline::builder()
        .config(config)
        .embedder(embedder)
        .generator(generator)
        .index(Arc::new(index))
        .build()
        .unwrap()
}

#[tokio::test]
async fn retrieves_relevant_document_and_not_unrelated_one() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), embedder.clone()).await;
    let generator = Arc::new(MockGenerator::new(
        "Vitamin D deficiency causes fatigue [DOC_1].",
    ));
    let config = PipelineConfig::builder().top_k(1).similarity_floor(0.3).build().unwrap();
    let pipeline = pipeline_with(index, embedder, generator, config);

    let response = pipeline.query("What causes fatigue related to vitamins?").await.unwrap();

    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].title, "Vitamin D");
    assert!(response.sources[0].chunk_id.starts_with("doc-a"));
    assert!(response.sources[0].relevance_score > 0.3);
    assert!(response.confidence > 0.0);
    assert!(response.answer.contains("[DOC_1]"));
}

#[tokio::test]
async fn similarity_floor_excludes_offtopic_candidates() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), embedder.clone()).await;
    let generator = Arc::new(MockGenerator::new("unused"));
    let config = PipelineConfig::builder().top_k(2).similarity_floor(0.3).build().unwrap();
    let pipeline = pipeline_with(index, embedder, generator, config);

    let retrieved = pipeline.retrieve("What causes fatigue related to vitamins?").await.unwrap();

    assert_eq!(retrieved.len(), 1);
    assert_eq!(retrieved[0].chunk.document_id, "doc-a");
}

#[tokio::test]
async fn refusal_path_never_calls_generator() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), embedder.clone()).await;
    let generator = Arc::new(MockGenerator::new("should never be produced"));
    let config = PipelineConfig::builder().top_k(2).similarity_floor(0.3).build().unwrap();
    let pipeline = pipeline_with(index, embedder, generator.clone(), config);

    let response = pipeline.query("quantum chromodynamics lattice regularization").await.unwrap();

    assert_eq!(response.answer, REFUSAL_ANSWER);
    assert_eq!(response.confidence, 0.0);
    assert!(response.sources.is_empty());
    assert!(response.warning.is_some());
    assert_eq!(response.generation_time_ms, 0.0);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn empty_corpus_refuses_without_error() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&[], embedder.clone()).await;
    assert!(index.is_empty());
    let generator = Arc::new(MockGenerator::new("unused"));
    let pipeline = pipeline_with(index, embedder, generator.clone(), PipelineConfig::default());

    let retrieved = pipeline.retrieve("anything at all").await.unwrap();
    assert!(retrieved.is_empty());

    let response = pipeline.query("anything at all").await.unwrap();
    assert_eq!(response.answer, REFUSAL_ANSWER);
    assert_eq!(response.confidence, 0.0);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn raising_similarity_floor_never_increases_result_count() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let documents = vec![
        doc("doc-1", "Anemia", "Iron deficiency anemia causes fatigue and pale skin."),
        doc("doc-2", "Iron", "Low iron levels cause fatigue in adults."),
        doc("doc-3", "Sleep", "Poor sleep quality causes daytime fatigue."),
        doc("doc-4", "Diabetes", "Diabetes symptoms include thirst and frequent urination."),
    ];
    let index = Arc::new(build_index(&documents, embedder.clone()).await);

    let mut previous = usize::MAX;
    for floor in [0.0, 0.2, 0.4, 0.6, 0.8] {
        let config = PipelineConfig::builder()
            .top_k(4)
            .similarity_floor(floor)
            .build()
            .unwrap();
        let pipeline = RagPipeline::builder()
            .config(config)
            .embedder(embedder.clone())
            .generator(Arc::new(MockGenerator::new("unused")))
            .index(index.clone())
            .build()
            .unwrap();

        let count = pipeline.retrieve("what causes fatigue from low iron").await.unwrap().len();
        assert!(count <= previous, "floor {floor} increased result count");
        previous = count;
    }
}

#[tokio::test]
async fn citations_refer_to_assembled_context_blocks() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let documents = vec![
        doc("doc-1", "Anemia", "Iron deficiency anemia causes fatigue and pale skin."),
        doc("doc-2", "Iron", "Low iron levels cause fatigue in adults."),
    ];
    let index = build_index(&documents, embedder.clone()).await;
    let generator = Arc::new(MockGenerator::new(
        "Low iron causes fatigue [DOC_1]. Anemia also presents with pale skin [DOC_2].",
    ));
    let config = PipelineConfig::builder().top_k(2).similarity_floor(0.3).build().unwrap();
    let pipeline = pipeline_with(index, embedder, generator, config);

    let response = pipeline.query("What causes fatigue from low iron?").await.unwrap();

    assert_eq!(response.sources.len(), 2);
    let cited = cited_indices(&response.answer);
    assert!(!cited.is_empty());
    for index in cited {
        assert!(
            index >= 1 && index <= response.sources.len(),
            "citation [DOC_{index}] has no matching context block"
        );
    }
}

#[tokio::test]
async fn transient_generation_failure_is_retried_once() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), embedder.clone()).await;
    let generator = Arc::new(
        MockGenerator::new("Vitamin D deficiency causes fatigue [DOC_1].")
            .with_transient_failure("rate limited"),
    );
    let config = PipelineConfig::builder().top_k(1).similarity_floor(0.3).build().unwrap();
    let pipeline = pipeline_with(index, embedder, generator.clone(), config);

    let response = pipeline.query("What causes fatigue related to vitamins?").await.unwrap();

    assert_eq!(generator.call_count(), 2);
    assert!(response.answer.contains("[DOC_1]"));
}

#[tokio::test]
async fn permanent_generation_failure_is_not_retried() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), embedder.clone()).await;
    let generator = Arc::new(
        MockGenerator::new("unused").with_permanent_failure("invalid API key"),
    );
    let config = PipelineConfig::builder().top_k(1).similarity_floor(0.3).build().unwrap();
    let pipeline = pipeline_with(index, embedder, generator.clone(), config);

    let err = pipeline.query("What causes fatigue related to vitamins?").await.unwrap_err();

    assert_eq!(generator.call_count(), 1);
    match err {
        RagError::Generation { transient, message, .. } => {
            assert!(!transient);
            assert!(message.contains("invalid API key"));
        }
        other => panic!("expected generation error, got {other:?}"),
    }
}

#[tokio::test]
async fn degraded_mode_returns_sources_on_generation_failure() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), embedder.clone()).await;
    let generator = Arc::new(
        MockGenerator::new("unused").with_permanent_failure("invalid API key"),
    );
    let config = PipelineConfig::builder()
        .top_k(1)
        .similarity_floor(0.3)
        .degraded_on_generation_failure(true)
        .build()
        .unwrap();
    let pipeline = pipeline_with(index, embedder, generator, config);

    let response = pipeline.query("What causes fatigue related to vitamins?").await.unwrap();

    assert_eq!(response.warning.as_deref(), Some(medrag::DEGRADED_WARNING));
    assert_eq!(response.sources.len(), 1);
    assert!(response.confidence > 0.0);
}

#[tokio::test]
async fn mismatched_embedding_model_fails_fast() {
    let index_embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), index_embedder).await;

    let query_embedder = Arc::new(MockEmbedder::new(DIM).with_model_id("other-model"));
    let generator = Arc::new(MockGenerator::new("unused"));
    let pipeline =
        pipeline_with(index, query_embedder, generator.clone(), PipelineConfig::default());

    let err = pipeline.query("What causes fatigue related to vitamins?").await.unwrap_err();

    match err {
        RagError::IndexVersionMismatch { index_model, query_model } => {
            assert_eq!(index_model, "mock-embedder");
            assert_eq!(query_model, "other-model");
        }
        other => panic!("expected version mismatch, got {other:?}"),
    }
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn disclaimer_is_appended_when_missing() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), embedder.clone()).await;
    let generator = Arc::new(MockGenerator::new("Vitamin D causes fatigue [DOC_1]."));
    let config = PipelineConfig::builder().top_k(1).similarity_floor(0.3).build().unwrap();
    let pipeline = pipeline_with(index, embedder, generator, config);

    let response = pipeline.query("What causes fatigue related to vitamins?").await.unwrap();

    assert!(response.answer.contains("educational purposes"));
}

#[tokio::test]
async fn disclaimer_is_not_duplicated() {
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let index = build_index(&vitamin_docs(), embedder.clone()).await;
    let generator = Arc::new(MockGenerator::new(
        "Vitamin D causes fatigue [DOC_1]. This information is for educational purposes only.",
    ));
    let config = PipelineConfig::builder().top_k(1).similarity_floor(0.3).build().unwrap();
    let pipeline = pipeline_with(index, embedder, generator, config);

    let response = pipeline.query("What causes fatigue related to vitamins?").await.unwrap();

    assert_eq!(response.answer.matches("educational purposes").count(), 1);
}
