//! Service state: one hot-swappable generation of index, retriever, and
//! pipeline.
//!
//! Readers take a cheap snapshot of the current [`Generation`] and keep
//! using it for the whole request; reload builds a complete replacement
//! off to the side and publishes it in one swap. No request ever
//! observes a retriever bound to an old index paired with a new
//! pipeline.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use vigil_core::schemas::{DocumentChunk, QueryRequest};
use vigil_core::{Settings, SourceType};
use vigil_embeddings::store::VectorStore;
use vigil_embeddings::{
    EmbeddingError, EmbeddingIndexer, EmbeddingProvider, FlatIpIndex, INDEX_FILE, METADATA_FILE,
};
use vigil_ingestion::{DocumentParser, TextChunker};
use vigil_ranking::RankerPredictor;

use crate::artifacts::ArtifactSource;
use crate::error::Result;
use crate::pipeline::RetrievalPipeline;
use crate::reranker::{ModelReranker, Reranker};
use crate::retriever::HybridRetriever;

/// Artifact-source prefix for index files.
const INDEX_PREFIX: &str = "index";

/// Artifact-source prefix for model files.
const MODELS_PREFIX: &str = "models";

/// One consistent set of search components bound to a single index.
pub struct Generation {
    pub store: Arc<RwLock<FlatIpIndex>>,
    pub retriever: Arc<HybridRetriever>,
    pub pipeline: Arc<RetrievalPipeline>,
}

/// Outcome of a document ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source_id: String,
    pub chunks_added: usize,
}

/// The retrieval service: owns the live generation and its collaborators.
pub struct SearchService {
    settings: Settings,
    provider: Arc<dyn EmbeddingProvider>,
    artifacts: Option<Arc<dyn ArtifactSource>>,
    reranker: Option<Arc<dyn Reranker>>,
    chunker: TextChunker,
    generation: RwLock<Arc<Generation>>,
}

impl SearchService {
    /// Initialize the service: sync artifacts, load the index (falling
    /// back to empty when no artifacts exist), load the ranking model
    /// (falling back to similarity-only ordering when absent), and build
    /// the first generation.
    pub async fn initialize(
        settings: Settings,
        provider: Arc<dyn EmbeddingProvider>,
        artifacts: Option<Arc<dyn ArtifactSource>>,
    ) -> Result<Self> {
        info!("Initializing search service");

        if let Some(source) = &artifacts {
            sync_index_artifacts(source.as_ref(), &settings).await?;
            sync_model_artifact(source.as_ref(), &settings).await?;
        }

        let store = load_or_empty_store(&settings).await?;

        let reranker: Option<Arc<dyn Reranker>> = if settings.ranker_model_path.exists() {
            let predictor = RankerPredictor::from_path(&settings.ranker_model_path).await?;
            Some(Arc::new(ModelReranker::new(predictor)))
        } else {
            info!("No ranking model artifact; queries use similarity order");
            None
        };

        let generation = build_generation(store, provider.clone(), reranker.clone(), &settings);
        let chunker = TextChunker::new(&settings);

        Ok(Self {
            settings,
            provider,
            artifacts,
            reranker,
            chunker,
            generation: RwLock::new(Arc::new(generation)),
        })
    }

    /// Snapshot the current generation.
    pub async fn generation(&self) -> Arc<Generation> {
        self.generation.read().await.clone()
    }

    /// Total number of chunks in the live index.
    pub async fn document_count(&self) -> usize {
        let generation = self.generation().await;
        let store = generation.store.read().await;
        store.count()
    }

    /// Answer a query against the live generation.
    ///
    /// Returns ranked `(chunk, score)` pairs plus the retrieval latency
    /// in milliseconds.
    pub async fn query(
        &self,
        request: &QueryRequest,
    ) -> Result<(Vec<(DocumentChunk, f32)>, f64)> {
        let generation = self.generation().await;
        generation
            .pipeline
            .run(
                &request.question,
                request.max_results,
                self.settings.retrieval_top_k,
                request.filters.as_ref(),
            )
            .await
    }

    /// Ingest a raw document: parse, chunk, embed, and index it into the
    /// live generation.
    pub async fn ingest(&self, source_type: SourceType, document: Value) -> Result<IngestReport> {
        let (source_id, chunks) = match source_type {
            SourceType::Advisory => {
                let advisory = DocumentParser::parse_advisory(document)?;
                (advisory.id.clone(), self.chunker.chunk_advisory(&advisory))
            }
            SourceType::ThreatReport => {
                let report = DocumentParser::parse_threat_report(document)?;
                (report.id.clone(), self.chunker.chunk_threat_report(&report))
            }
            SourceType::Incident => {
                let incident = DocumentParser::parse_incident(document)?;
                (incident.id.clone(), self.chunker.chunk_incident(&incident))
            }
        };

        let generation = self.generation().await;
        let indexer = EmbeddingIndexer::new(self.provider.clone(), generation.store.clone());
        let chunks_added = indexer
            .index_chunks(chunks, self.settings.embedding_batch_size)
            .await?;

        info!("Ingested {source_id}: {chunks_added} chunks");
        Ok(IngestReport {
            source_id,
            chunks_added,
        })
    }

    /// Persist the live index to the configured local path.
    pub async fn save_index(&self) -> Result<()> {
        let generation = self.generation().await;
        let store = generation.store.read().await;
        store.save(&self.settings.index_path).await?;
        Ok(())
    }

    /// Re-sync the index artifacts and hot-swap the in-memory store.
    ///
    /// Stale local artifacts are deleted before fetching so a reload
    /// never observes a mix of old and new files. The replacement
    /// generation is built completely before being published; on any
    /// failure the previous generation keeps serving.
    ///
    /// Returns `(previous_count, current_count)`.
    pub async fn reload_index(&self) -> Result<(usize, usize)> {
        let previous_count = self.document_count().await;

        // Stale-then-fresh: remove local copies, then re-fetch.
        for filename in [INDEX_FILE, METADATA_FILE] {
            let local = self.settings.index_path.join(filename);
            if local.exists() {
                tokio::fs::remove_file(&local).await?;
            }
        }
        if let Some(source) = &self.artifacts {
            sync_index_artifacts(source.as_ref(), &self.settings).await?;
        }

        let store = load_or_empty_store(&self.settings).await?;
        let current_count = store.count();

        let generation = build_generation(
            store,
            self.provider.clone(),
            self.reranker.clone(),
            &self.settings,
        );
        *self.generation.write().await = Arc::new(generation);

        info!("Reloaded index: {previous_count} → {current_count} chunks");
        Ok((previous_count, current_count))
    }
}

/// Build a complete generation around a freshly constructed store.
fn build_generation(
    store: FlatIpIndex,
    provider: Arc<dyn EmbeddingProvider>,
    reranker: Option<Arc<dyn Reranker>>,
    settings: &Settings,
) -> Generation {
    let store = Arc::new(RwLock::new(store));
    let retriever = Arc::new(
        HybridRetriever::new(provider, store.clone())
            .with_fetch_multiplier(settings.fetch_multiplier),
    );
    let pipeline = Arc::new(RetrievalPipeline::new(retriever.clone(), reranker));
    Generation {
        store,
        retriever,
        pipeline,
    }
}

/// Load the index from the configured path, treating absent artifacts as
/// an empty index. Corrupt artifacts are an error.
async fn load_or_empty_store(settings: &Settings) -> Result<FlatIpIndex> {
    let mut store = FlatIpIndex::new(settings.embedding_dimension);
    if settings.index_path.join(INDEX_FILE).exists() {
        match store.load(&settings.index_path).await {
            Ok(()) => {}
            Err(EmbeddingError::IndexNotFound { .. }) => {
                warn!("Partial index artifacts; starting with an empty index");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(store)
}

async fn sync_index_artifacts(source: &dyn ArtifactSource, settings: &Settings) -> Result<()> {
    for filename in [INDEX_FILE, METADATA_FILE] {
        let local = settings.index_path.join(filename);
        if !local.exists()
            && !source
                .fetch(&format!("{INDEX_PREFIX}/{filename}"), &local)
                .await?
        {
            info!("Index artifacts unavailable at source; starting with empty store");
            return Ok(());
        }
    }
    Ok(())
}

async fn sync_model_artifact(source: &dyn ArtifactSource, settings: &Settings) -> Result<()> {
    let local = &settings.ranker_model_path;
    if local.exists() {
        return Ok(());
    }
    let Some(filename) = local.file_name().and_then(|n| n.to_str()) else {
        return Ok(());
    };
    if !source
        .fetch(&format!("{MODELS_PREFIX}/{filename}"), local)
        .await?
    {
        info!("Ranking model unavailable at source; skipping");
    }
    Ok(())
}
