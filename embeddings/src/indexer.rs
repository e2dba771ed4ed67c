//! Bridge between embedding generation and the vector index.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use vigil_core::schemas::DocumentChunk;

use crate::error::Result;
use crate::provider::EmbeddingProvider;
use crate::store::{FlatIpIndex, VectorStore};

/// Build and update the embedding index from document chunks.
pub struct EmbeddingIndexer {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<RwLock<FlatIpIndex>>,
}

impl EmbeddingIndexer {
    /// Create an indexer over the given provider and store.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Arc<RwLock<FlatIpIndex>>) -> Self {
        Self { provider, store }
    }

    /// Generate embeddings for chunks that lack one and add the full set
    /// to the store.
    ///
    /// Returns the number of chunks indexed.
    pub async fn index_chunks(
        &self,
        chunks: Vec<DocumentChunk>,
        batch_size: usize,
    ) -> Result<usize> {
        let (embedded, mut to_embed): (Vec<DocumentChunk>, Vec<DocumentChunk>) =
            chunks.into_iter().partition(|c| c.embedding.is_some());

        if !to_embed.is_empty() {
            debug!("Embedding {} chunks", to_embed.len());
            let texts: Vec<String> = to_embed.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.provider.embed_texts(&texts, batch_size).await?;
            for (chunk, embedding) in to_embed.iter_mut().zip(embeddings) {
                chunk.embedding = Some(embedding);
            }
        }

        let mut all_chunks = embedded;
        all_chunks.extend(to_embed);
        let indexed = all_chunks.len();

        if !all_chunks.is_empty() {
            self.store.write().await.add(all_chunks)?;
        }

        info!("Indexed {indexed} chunks");
        Ok(indexed)
    }

    /// Delete any existing entries for the given chunks, clear their
    /// embeddings, and re-run [`Self::index_chunks`].
    ///
    /// Used to force recomputation after an embedding-model change.
    pub async fn reindex_all(
        &self,
        mut chunks: Vec<DocumentChunk>,
        batch_size: usize,
    ) -> Result<usize> {
        let existing_ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
        self.store.write().await.delete(&existing_ids)?;
        for chunk in &mut chunks {
            chunk.embedding = None;
        }
        self.index_chunks(chunks, batch_size).await
    }
}
