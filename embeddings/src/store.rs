//! Flat inner-product vector index with paired disk artifacts.
//!
//! The index keeps parallel state: the chunk records, an id→row map, and
//! a row-major embedding matrix whose rows are unit-normalized so inner
//! product equals cosine similarity. Deletes rebuild the matrix from the
//! surviving chunks; there is no tombstoning.
//!
//! Persistence writes two companion files that must travel together:
//! [`INDEX_FILE`] (the matrix) and [`METADATA_FILE`] (the chunk
//! records). A load with either file missing fails without touching the
//! in-memory state.

use std::collections::HashMap;
use std::path::Path;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use vigil_core::schemas::DocumentChunk;

use crate::error::{EmbeddingError, Result};
use crate::similarity::normalize;

/// File name of the serialized embedding matrix.
pub const INDEX_FILE: &str = "index.json";

/// File name of the chunk-record sidecar.
pub const METADATA_FILE: &str = "metadata.json";

/// Capability interface for vector storage backends.
pub trait VectorStore {
    /// Add document chunks with embeddings to the store.
    fn add(&mut self, chunks: Vec<DocumentChunk>) -> Result<()>;

    /// Search for similar chunks and return `(chunk, score)` pairs in
    /// descending score order.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<(DocumentChunk, f32)>>;

    /// Delete chunks by their IDs, rebuilding the index from the
    /// survivors.
    fn delete(&mut self, chunk_ids: &[String]) -> Result<()>;

    /// Return the number of chunks in the store.
    fn count(&self) -> usize;
}

/// Serialized form of the embedding matrix.
#[derive(Debug, Serialize, Deserialize)]
struct IndexArtifact {
    dimension: usize,
    rows: usize,
    /// Row-major, unit-normalized matrix data.
    data: Vec<f32>,
}

/// Exact inner-product index over a flat embedding matrix.
pub struct FlatIpIndex {
    dimension: usize,
    /// Row-major matrix; row `i` belongs to `chunks[i]`.
    data: Vec<f32>,
    chunks: Vec<DocumentChunk>,
    id_to_position: HashMap<String, usize>,
}

impl FlatIpIndex {
    /// Create an empty index with the given vector dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
            chunks: Vec::new(),
            id_to_position: HashMap::new(),
        }
    }

    /// The vector dimension this index holds.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The stored chunks, in insertion order.
    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    /// Look up a chunk by id.
    pub fn get(&self, id: &str) -> Option<&DocumentChunk> {
        self.id_to_position.get(id).map(|&i| &self.chunks[i])
    }

    /// Persist the index to `path` as the paired matrix and metadata
    /// artifacts. Both files are written atomically via temp-file
    /// rename.
    pub async fn save(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path).await?;

        let artifact = IndexArtifact {
            dimension: self.dimension,
            rows: self.chunks.len(),
            data: self.data.clone(),
        };
        write_atomic(&path.join(INDEX_FILE), &serde_json::to_vec(&artifact)?).await?;
        write_atomic(
            &path.join(METADATA_FILE),
            &serde_json::to_vec_pretty(&self.chunks)?,
        )
        .await?;

        info!("Saved index with {} chunks to {}", self.chunks.len(), path.display());
        Ok(())
    }

    /// Restore the index from the paired artifacts at `path`.
    ///
    /// Fails with [`EmbeddingError::IndexNotFound`] if either artifact
    /// is missing, and with [`EmbeddingError::CorruptIndex`] if the two
    /// artifacts disagree. On any failure the in-memory state is left
    /// untouched. The artifact's dimension is authoritative and replaces
    /// the index's configured dimension.
    pub async fn load(&mut self, path: &Path) -> Result<()> {
        let index_path = path.join(INDEX_FILE);
        let metadata_path = path.join(METADATA_FILE);
        if !index_path.exists() || !metadata_path.exists() {
            return Err(EmbeddingError::IndexNotFound {
                path: path.display().to_string(),
            });
        }

        let artifact: IndexArtifact =
            serde_json::from_slice(&tokio::fs::read(&index_path).await?)?;
        let chunks: Vec<DocumentChunk> =
            serde_json::from_slice(&tokio::fs::read(&metadata_path).await?)?;

        if artifact.data.len() != artifact.dimension * artifact.rows {
            return Err(EmbeddingError::CorruptIndex(format!(
                "matrix holds {} values, expected {} ({} rows of dimension {})",
                artifact.data.len(),
                artifact.dimension * artifact.rows,
                artifact.rows,
                artifact.dimension
            )));
        }
        if chunks.len() != artifact.rows {
            return Err(EmbeddingError::CorruptIndex(format!(
                "metadata holds {} records, matrix holds {} rows",
                chunks.len(),
                artifact.rows
            )));
        }

        let id_to_position = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        self.dimension = artifact.dimension;
        self.data = artifact.data;
        self.chunks = chunks;
        self.id_to_position = id_to_position;

        info!("Loaded index with {} chunks from {}", self.chunks.len(), path.display());
        Ok(())
    }

    fn rebuild(&mut self, chunks: Vec<DocumentChunk>) -> Result<()> {
        self.data.clear();
        self.chunks.clear();
        self.id_to_position.clear();
        if chunks.is_empty() {
            return Ok(());
        }
        self.add(chunks)
    }
}

impl VectorStore for FlatIpIndex {
    fn add(&mut self, chunks: Vec<DocumentChunk>) -> Result<()> {
        // Validate the whole batch before mutating anything.
        for chunk in &chunks {
            let embedding = chunk
                .embedding
                .as_ref()
                .ok_or_else(|| EmbeddingError::UnembeddedChunk {
                    id: chunk.id.clone(),
                })?;
            if embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        for chunk in chunks {
            let mut row = chunk.embedding.clone().unwrap_or_default();
            normalize(&mut row);
            self.data.extend_from_slice(&row);
            self.id_to_position.insert(chunk.id.clone(), self.chunks.len());
            debug!("Indexed chunk {}", chunk.id);
            self.chunks.push(chunk);
        }

        Ok(())
    }

    fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<(DocumentChunk, f32)>> {
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }
        if query_embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }

        let mut query = query_embedding.to_vec();
        normalize(&mut query);

        let mut scores: Vec<(OrderedFloat<f32>, usize)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(i, row)| {
                let score: f32 = row.iter().zip(query.iter()).map(|(x, y)| x * y).sum();
                (OrderedFloat(score), i)
            })
            .collect();

        // Sort by score descending.
        scores.sort_by(|a, b| b.0.cmp(&a.0));

        let k = top_k.min(self.chunks.len());
        Ok(scores
            .into_iter()
            .take(k)
            .map(|(score, i)| (self.chunks[i].clone(), score.0))
            .collect())
    }

    fn delete(&mut self, chunk_ids: &[String]) -> Result<()> {
        let ids: std::collections::HashSet<&String> = chunk_ids.iter().collect();
        let remaining: Vec<DocumentChunk> = self
            .chunks
            .iter()
            .filter(|c| !ids.contains(&c.id))
            .cloned()
            .collect();

        let removed = self.chunks.len() - remaining.len();
        self.rebuild(remaining)?;
        if removed > 0 {
            debug!("Deleted {removed} chunks, {} remain", self.chunks.len());
        }
        Ok(())
    }

    fn count(&self) -> usize {
        self.chunks.len()
    }
}

async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, content).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}
