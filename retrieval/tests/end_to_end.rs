//! End-to-end scenarios across the retrieval stack: index → search →
//! filter → rerank.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use vigil_core::enums::{Severity, SourceType};
use vigil_core::schemas::{DocumentChunk, QueryFilters};
use vigil_embeddings::store::VectorStore;
use vigil_embeddings::{Embedding, EmbeddingProvider, FlatIpIndex};
use vigil_ranking::{RankerPredictor, RankerTrainer};
use vigil_retrieval::{HybridRetriever, ModelReranker, Reranker, RetrievalPipeline};

const DIMENSION: usize = 8;

/// Provider that always embeds to the direction of chunk 3.
struct FixedProvider(Vec<f32>);

#[async_trait]
impl EmbeddingProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    async fn embed_text(&self, _text: &str) -> vigil_embeddings::Result<Embedding> {
        Ok(self.0.clone())
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn embedding_for(index: usize) -> Vec<f32> {
    let mut embedding = vec![0.0f32; DIMENSION];
    embedding[index % DIMENSION] = 1.0;
    embedding[(index + 1) % DIMENSION] = 0.25;
    embedding
}

fn chunk(index: usize, severity: &str) -> DocumentChunk {
    let mut metadata = serde_json::Map::new();
    metadata.insert("severity".to_string(), severity.into());
    metadata.insert(
        "published".to_string(),
        "2024-04-01T00:00:00+00:00".into(),
    );
    DocumentChunk {
        id: format!("chunk-{index}"),
        source_id: format!("DOC-{index}"),
        source_type: SourceType::Advisory,
        content: format!("advisory chunk number {index}"),
        metadata,
        embedding: Some(embedding_for(index)),
    }
}

fn populated_index() -> FlatIpIndex {
    let mut index = FlatIpIndex::new(DIMENSION);
    let severities = ["critical", "high", "medium", "low", "critical"];
    index
        .add((0..5).map(|i| chunk(i, severities[i])).collect())
        .unwrap();
    index
}

#[test]
fn search_finds_exact_chunk_first() {
    let index = populated_index();
    let results = index.search(&embedding_for(3), 3).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0.id, "chunk-3");
    assert!((results[0].1 - 1.0).abs() < 1e-5);
    for pair in results.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
}

#[test]
fn search_on_empty_index_returns_nothing() {
    let index = FlatIpIndex::new(DIMENSION);
    assert!(index.search(&embedding_for(0), 10).unwrap().is_empty());
}

#[tokio::test]
async fn retrieve_honors_severity_filter() {
    let store = Arc::new(RwLock::new(populated_index()));
    let provider = Arc::new(FixedProvider(embedding_for(3)));
    let retriever = HybridRetriever::new(provider, store);

    let filters = QueryFilters {
        severity: Some(vec![Severity::Critical]),
        ..Default::default()
    };
    let results = retriever
        .retrieve("anything", 10, Some(&filters))
        .await
        .unwrap();

    assert!(!results.is_empty());
    for (chunk, _) in &results {
        assert_eq!(chunk.metadata_str("severity"), Some("critical"));
    }

    // A filter nothing matches yields an empty result, not an error.
    let filters = QueryFilters {
        severity: Some(vec![Severity::High]),
        ..Default::default()
    };
    let results = retriever
        .retrieve("anything", 10, Some(&filters))
        .await
        .unwrap();
    assert_eq!(
        results
            .iter()
            .filter(|(c, _)| c.metadata_str("severity") != Some("high"))
            .count(),
        0
    );
}

#[tokio::test]
async fn full_pipeline_with_reranker() {
    let store = Arc::new(RwLock::new(populated_index()));
    let provider = Arc::new(FixedProvider(embedding_for(3)));
    let retriever = Arc::new(HybridRetriever::new(provider, store));

    let model = RankerTrainer::new()
        .with_n_estimators(20)
        .train_from_synthetic(20, 10, 42)
        .unwrap();
    let reranker: Arc<dyn Reranker> =
        Arc::new(ModelReranker::new(RankerPredictor::from_model(model)));

    let pipeline = RetrievalPipeline::new(retriever, Some(reranker));
    let (results, elapsed_ms) = pipeline.run("anything", 3, 5, None).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(elapsed_ms >= 0.0);
    // Model scores descend.
    for pair in results.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
    // Membership is preserved: every result came from the index.
    for (chunk, _) in &results {
        assert!(chunk.id.starts_with("chunk-"));
    }
}
