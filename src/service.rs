//! The retrieval service: owns the loaded corpus and serves
//! citation-bearing retrieval calls.
//!
//! A [`RagService`] is built once per generation request from the
//! session's uploaded files: load → chunk → embed → index. The index is
//! single-writer — built before any retrieval happens, read-only
//! afterward. Adding documents rebuilds everything from scratch so that
//! chunk ids stay a pure function of (document, page, position).
//!
//! Failure policy: provider construction problems (missing credential,
//! unknown provider) are fatal here, at construction. Provider or
//! network failures during retrieval degrade to empty results with a
//! warning; only a total absence of content is surfaced to callers.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::chunker::split_pages;
use crate::citations::to_citations;
use crate::config::Config;
use crate::embedding::{create_provider, EmbeddingProvider};
use crate::index::VectorIndex;
use crate::loader::load_documents;
use crate::models::{Chunk, RetrievalOutput};
use crate::retriever::{RetrievalMode, RetrieverStrategy, VectorRetriever};

/// Retrieval pipeline over one session's uploaded documents.
pub struct RagService {
    config: Config,
    provider: Arc<dyn EmbeddingProvider>,
    file_paths: Vec<String>,
    chunks: Vec<Chunk>,
    retriever: Box<dyn RetrieverStrategy>,
}

impl RagService {
    /// Build the service from configuration and source file paths.
    ///
    /// Fails fast on configuration errors (unknown provider, missing
    /// API key). An empty corpus — no loadable files, or nothing but
    /// whitespace — is not an error: the service constructs with an
    /// empty index and retrieval returns empty results.
    pub async fn new(config: &Config, file_paths: Vec<String>) -> Result<Self> {
        let provider = create_provider(&config.embedding)?;
        Self::with_provider(config, provider, file_paths).await
    }

    /// Build the service with an explicit embedding provider.
    ///
    /// This is the seam tests use to supply a deterministic embedder.
    pub async fn with_provider(
        config: &Config,
        provider: Arc<dyn EmbeddingProvider>,
        file_paths: Vec<String>,
    ) -> Result<Self> {
        info!(files = file_paths.len(), "initializing retrieval service");

        let (chunks, retriever) = build_pipeline(config, &provider, &file_paths).await?;

        Ok(Self {
            config: config.clone(),
            provider,
            file_paths,
            chunks,
            retriever,
        })
    }

    /// Retrieve the top chunks for a query, with their citations.
    ///
    /// Citation ids are 1-based and local to this call. Provider and
    /// network failures degrade to an empty result with a warning; an
    /// unbuilt (empty) index does the same.
    pub async fn retrieve_for_query(
        &self,
        query: &str,
        top_k: usize,
        mode: RetrievalMode,
    ) -> RetrievalOutput {
        match self.retriever.retrieve(query, top_k, mode).await {
            Ok(chunks) => {
                let citations = to_citations(&chunks);
                RetrievalOutput { chunks, citations }
            }
            Err(e) => {
                warn!(query = %query, error = %e, "retrieval failed, returning empty results");
                RetrievalOutput::empty()
            }
        }
    }

    /// Add new documents and rebuild chunks and index from scratch.
    ///
    /// The rebuild re-derives every chunk id from (document, page,
    /// position); no counter state survives from the previous build.
    pub async fn add_documents(&mut self, new_file_paths: Vec<String>) -> Result<()> {
        self.file_paths.extend(new_file_paths);
        let (chunks, retriever) =
            build_pipeline(&self.config, &self.provider, &self.file_paths).await?;
        self.chunks = chunks;
        self.retriever = retriever;
        Ok(())
    }

    /// Number of indexed chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// True when no content was loaded; retrieval will return nothing.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Shared build path for construction and full rebuilds.
async fn build_pipeline(
    config: &Config,
    provider: &Arc<dyn EmbeddingProvider>,
    file_paths: &[String],
) -> Result<(Vec<Chunk>, Box<dyn RetrieverStrategy>)> {
    let pages = load_documents(file_paths);
    let chunks = split_pages(&pages, &config.chunking);

    if chunks.is_empty() {
        warn!("no chunks produced, retrieval will be unavailable");
    } else {
        info!(
            pages = pages.len(),
            chunks = chunks.len(),
            "documents split into chunks with citation metadata"
        );
    }

    let index = VectorIndex::build(
        provider.as_ref(),
        chunks.clone(),
        config.embedding.batch_size,
    )
    .await?;

    let retriever: Box<dyn RetrieverStrategy> = Box::new(VectorRetriever::new(
        Arc::clone(provider),
        Arc::new(index),
        config.retrieval.clone(),
    ));

    Ok((chunks, retriever))
}
