//! Retrieval strategies.
//!
//! [`RetrieverStrategy`] is the seam between the pipeline and the
//! ranking algorithm. One concrete strategy exists: [`VectorRetriever`],
//! which embeds the query and selects a diverse top-k by maximal
//! marginal relevance over a wider candidate pool. A graph-based
//! strategy can plug in behind the same trait; [`RetrievalMode`] is the
//! mode switch it would consume (the vector strategy ranks identically
//! in both modes).

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::embedding::{cosine_similarity, embed_query, EmbeddingProvider};
use crate::index::{ScoredChunk, VectorIndex};
use crate::models::Chunk;

/// Retrieval mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetrievalMode {
    #[default]
    Local,
    Global,
}

impl FromStr for RetrievalMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(Self::Local),
            "global" => Ok(Self::Global),
            other => bail!("Unknown retrieval mode: {}. Use local or global.", other),
        }
    }
}

/// A pluggable retrieval strategy.
///
/// For a fixed corpus and query, `retrieve` must return the same chunks
/// in the same order on every call.
#[async_trait]
pub trait RetrieverStrategy: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize, mode: RetrievalMode) -> Result<Vec<Chunk>>;
}

/// Vector-similarity retrieval with maximal-marginal-relevance
/// diversity selection.
///
/// Fetches a candidate pool of `max(2 * k, candidate_pool)` nearest
/// neighbors, then greedily picks `k` chunks maximizing
/// `lambda * relevance - (1 - lambda) * redundancy`, where redundancy
/// is the highest cosine similarity to any already-selected chunk.
pub struct VectorRetriever {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    params: RetrievalConfig,
}

impl VectorRetriever {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<VectorIndex>,
        params: RetrievalConfig,
    ) -> Self {
        Self {
            provider,
            index,
            params,
        }
    }
}

#[async_trait]
impl RetrieverStrategy for VectorRetriever {
    async fn retrieve(&self, query: &str, k: usize, mode: RetrievalMode) -> Result<Vec<Chunk>> {
        if k == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        if self.index.is_empty() {
            warn!("no index available, retrieval is disabled");
            return Ok(Vec::new());
        }

        let query_vec = embed_query(self.provider.as_ref(), query).await?;

        let pool_k = (2 * k).max(self.params.candidate_pool);
        let pool = self.index.search(&query_vec, pool_k);
        debug!(
            query = %query,
            ?mode,
            pool = pool.len(),
            k,
            "selecting diverse top-k from candidate pool"
        );

        Ok(mmr_select(pool, k, self.params.mmr_lambda)
            .into_iter()
            .map(|sc| sc.chunk)
            .collect())
    }
}

/// Greedy maximal-marginal-relevance selection.
///
/// The pool must already be sorted by relevance descending. Ties are
/// broken by pool position, which the index keeps deterministic.
fn mmr_select(pool: Vec<ScoredChunk>, k: usize, lambda: f32) -> Vec<ScoredChunk> {
    if pool.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut remaining = pool;
    let mut selected: Vec<ScoredChunk> = Vec::with_capacity(k.min(remaining.len()));

    // The most relevant candidate always goes first.
    selected.push(remaining.remove(0));

    while selected.len() < k && !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (idx, candidate) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|s| cosine_similarity(&candidate.vector, &s.vector))
                .fold(f32::NEG_INFINITY, f32::max);
            let mmr = lambda * candidate.score - (1.0 - lambda) * redundancy;
            // Strict comparison keeps the earlier (more relevant) candidate on ties.
            if mmr > best_score {
                best_score = mmr;
                best_idx = idx;
            }
        }

        selected.push(remaining.remove(best_idx));
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, score: f32, vector: Vec<f32>) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                content: id.to_string(),
                document_id: "doc".to_string(),
                source: "doc.txt".to_string(),
                page_number: 1,
                chunk_index: 0,
                chunk_id: id.to_string(),
                content_preview: id.to_string(),
                word_count: 1,
                hash: id.to_string(),
            },
            score,
            vector,
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("local".parse::<RetrievalMode>().unwrap(), RetrievalMode::Local);
        assert_eq!("global".parse::<RetrievalMode>().unwrap(), RetrievalMode::Global);
        assert!("hybrid".parse::<RetrievalMode>().is_err());
    }

    #[test]
    fn test_mmr_empty_pool() {
        assert!(mmr_select(Vec::new(), 5, 0.5).is_empty());
    }

    #[test]
    fn test_mmr_takes_most_relevant_first() {
        let pool = vec![
            scored("a", 0.9, vec![1.0, 0.0]),
            scored("b", 0.8, vec![0.0, 1.0]),
        ];
        let picked = mmr_select(pool, 1, 0.5);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].chunk.chunk_id, "a");
    }

    #[test]
    fn test_mmr_penalizes_redundancy() {
        // "b" is a near-duplicate of "a"; "c" is less relevant but novel.
        let pool = vec![
            scored("a", 0.95, vec![1.0, 0.0]),
            scored("b", 0.94, vec![1.0, 0.01]),
            scored("c", 0.60, vec![0.0, 1.0]),
        ];
        let picked = mmr_select(pool, 2, 0.5);
        let ids: Vec<&str> = picked.iter().map(|s| s.chunk.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_mmr_lambda_one_is_pure_relevance() {
        let pool = vec![
            scored("a", 0.95, vec![1.0, 0.0]),
            scored("b", 0.94, vec![1.0, 0.0]),
            scored("c", 0.60, vec![0.0, 1.0]),
        ];
        let picked = mmr_select(pool, 2, 1.0);
        let ids: Vec<&str> = picked.iter().map(|s| s.chunk.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_mmr_deterministic() {
        let pool = vec![
            scored("a", 0.9, vec![1.0, 0.0, 0.0]),
            scored("b", 0.8, vec![0.9, 0.1, 0.0]),
            scored("c", 0.8, vec![0.0, 1.0, 0.0]),
            scored("d", 0.7, vec![0.0, 0.0, 1.0]),
        ];
        let first: Vec<String> = mmr_select(pool.clone(), 3, 0.5)
            .iter()
            .map(|s| s.chunk.chunk_id.clone())
            .collect();
        for _ in 0..5 {
            let again: Vec<String> = mmr_select(pool.clone(), 3, 0.5)
                .iter()
                .map(|s| s.chunk.chunk_id.clone())
                .collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_mmr_k_larger_than_pool() {
        let pool = vec![scored("a", 0.9, vec![1.0]), scored("b", 0.5, vec![0.5])];
        let picked = mmr_select(pool, 10, 0.5);
        assert_eq!(picked.len(), 2);
    }
}
