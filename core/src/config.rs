//! Runtime settings with environment overrides.
//!
//! Every field has a default suitable for local development; deployments
//! override via `VIGIL_`-prefixed environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable prefix for all settings.
const ENV_PREFIX: &str = "VIGIL_";

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding raw threat-intelligence documents.
    pub data_dir: PathBuf,

    /// Directory the vector index artifacts are written to and read from.
    pub index_path: PathBuf,

    /// Path of the trained ranking model artifact.
    pub ranker_model_path: PathBuf,

    /// Optional directory artifacts are synced from at startup and on
    /// reload. When unset, only local artifacts are used.
    pub artifact_source_dir: Option<PathBuf>,

    /// Embedding endpoint base URL. When unset the provider is not
    /// configured and embedding calls fail.
    pub embedding_endpoint: Option<String>,

    /// Embedding model identifier sent to the endpoint.
    pub embedding_model_id: String,

    /// Embedding vector dimension.
    pub embedding_dimension: usize,

    /// Words per chunk.
    pub chunk_size: usize,

    /// Words repeated between consecutive chunks.
    pub chunk_overlap: usize,

    /// Candidates fetched from the index per query before filtering.
    pub retrieval_top_k: usize,

    /// Results kept after reranking.
    pub rerank_top_k: usize,

    /// Over-fetch multiplier applied before metadata filtering. A fixed
    /// multiplier can under-fill highly selective filters; raise it when
    /// filters are routinely narrow.
    pub fetch_multiplier: usize,

    /// Batch size for embedding generation.
    pub embedding_batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_path: PathBuf::from("data/index"),
            ranker_model_path: PathBuf::from("models/ranker.json"),
            artifact_source_dir: None,
            embedding_endpoint: None,
            embedding_model_id: "titan-embed-text-v2".to_string(),
            embedding_dimension: 1024,
            chunk_size: 512,
            chunk_overlap: 64,
            retrieval_top_k: 20,
            rerank_top_k: 5,
            fetch_multiplier: 2,
            embedding_batch_size: 10,
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults for
    /// unset or unparseable variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env_path("DATA_DIR").unwrap_or(defaults.data_dir),
            index_path: env_path("INDEX_PATH").unwrap_or(defaults.index_path),
            ranker_model_path: env_path("RANKER_MODEL_PATH").unwrap_or(defaults.ranker_model_path),
            artifact_source_dir: env_path("ARTIFACT_SOURCE_DIR"),
            embedding_endpoint: env_var("EMBEDDING_ENDPOINT"),
            embedding_model_id: env_var("EMBEDDING_MODEL_ID")
                .unwrap_or(defaults.embedding_model_id),
            embedding_dimension: env_parsed("EMBEDDING_DIMENSION")
                .unwrap_or(defaults.embedding_dimension),
            chunk_size: env_parsed("CHUNK_SIZE").unwrap_or(defaults.chunk_size),
            chunk_overlap: env_parsed("CHUNK_OVERLAP").unwrap_or(defaults.chunk_overlap),
            retrieval_top_k: env_parsed("RETRIEVAL_TOP_K").unwrap_or(defaults.retrieval_top_k),
            rerank_top_k: env_parsed("RERANK_TOP_K").unwrap_or(defaults.rerank_top_k),
            fetch_multiplier: env_parsed("FETCH_MULTIPLIER").unwrap_or(defaults.fetch_multiplier),
            embedding_batch_size: env_parsed("EMBEDDING_BATCH_SIZE")
                .unwrap_or(defaults.embedding_batch_size),
        }
    }

    /// Set the index directory.
    pub fn with_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = path.into();
        self
    }

    /// Set the ranking model artifact path.
    pub fn with_ranker_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ranker_model_path = path.into();
        self
    }

    /// Set the artifact sync source directory.
    pub fn with_artifact_source_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_source_dir = Some(path.into());
        self
    }

    /// Set the embedding endpoint.
    pub fn with_embedding_endpoint(mut self, url: impl Into<String>) -> Self {
        self.embedding_endpoint = Some(url.into());
        self
    }

    /// Set the embedding dimension.
    pub fn with_embedding_dimension(mut self, dimension: usize) -> Self {
        self.embedding_dimension = dimension;
        self
    }

    /// Set the chunking window and overlap.
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_var(name).map(PathBuf::from)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|v| v.parse().ok())
}
