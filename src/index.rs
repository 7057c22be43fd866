//! In-memory vector index over chunks.
//!
//! Built once per [`RagService`](crate::service::RagService) lifetime
//! from the full chunk set; adding documents rebuilds from scratch (no
//! incremental insert, no persistence). Search is brute-force cosine
//! similarity over all stored vectors, which is more than adequate for
//! the handful of uploaded documents a drafting session works with.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info};

use crate::embedding::{cosine_similarity, EmbeddingProvider};
use crate::models::Chunk;

/// A chunk scored against a query vector.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
    /// Stored embedding, kept for diversity re-ranking.
    pub vector: Vec<f32>,
}

struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Embedded chunks plus their vectors. Single-writer: built before any
/// reader exists, read-only afterward.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// An index with no content; every search returns empty results.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Embed all chunks and build the index.
    ///
    /// Identical chunk texts (by content hash) are sent to the provider
    /// once and share a vector. Embedding happens in `batch_size`
    /// batches. An empty chunk set builds an empty index without
    /// calling the provider.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        chunks: Vec<Chunk>,
        batch_size: usize,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Ok(Self::empty());
        }

        // Unique texts by content hash, in first-seen order.
        let mut hash_order: Vec<&str> = Vec::new();
        let mut texts_by_hash: HashMap<&str, &str> = HashMap::new();
        for chunk in &chunks {
            texts_by_hash.entry(chunk.hash.as_str()).or_insert_with(|| {
                hash_order.push(chunk.hash.as_str());
                chunk.content.as_str()
            });
        }

        let unique_texts: Vec<String> = hash_order
            .iter()
            .map(|h| texts_by_hash[h].to_string())
            .collect();

        debug!(
            chunks = chunks.len(),
            unique = unique_texts.len(),
            model = provider.model_name(),
            "embedding chunks"
        );

        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(unique_texts.len());
        for batch in unique_texts.chunks(batch_size.max(1)) {
            let batch_vectors = provider.embed(batch).await?;
            vectors.extend(batch_vectors);
        }
        anyhow::ensure!(
            vectors.len() == unique_texts.len(),
            "provider returned {} vectors for {} texts",
            vectors.len(),
            unique_texts.len()
        );

        let vector_by_hash: HashMap<&str, &Vec<f32>> =
            hash_order.iter().copied().zip(vectors.iter()).collect();

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .map(|chunk| IndexEntry {
                chunk: chunk.clone(),
                vector: vector_by_hash[chunk.hash.as_str()].clone(),
            })
            .collect();

        info!(chunks = entries.len(), "vector index built");
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nearest-neighbor search: top `pool_k` entries by cosine
    /// similarity, score descending with chunk_id ascending as the
    /// deterministic tie-break.
    pub fn search(&self, query_vec: &[f32], pool_k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_vec, &entry.vector),
                vector: entry.vector.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id))
        });
        scored.truncate(pool_k);
        scored
    }
}
