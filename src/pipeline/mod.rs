//! Query → {semantic, lexical} → fuse → rerank → gate.
//!
//! [`HybridRetriever`] wires the stages together over trait objects so tests can swap in mocks.
//! [`PipelineServices`] owns the lazily built production handles (encoder, Qdrant, cross-encoder).

pub mod config;
pub mod format;


pub use config::RetrievalConfig;
pub use format::{format_error, format_passages, is_error_sentinel};

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::corpus::{CorpusStore, Passage, QdrantCorpusStore};
use crate::embedding::{EncoderService, PairScorer, QueryEncoder, RerankerService};
use crate::hashing::query_fingerprint;
use crate::retrieval::{Candidate, LexicalRetriever, RetrievalError, SemanticRetriever, merge};
use crate::scoring::{CandidateReranker, ScoredCandidate};

/// Hybrid retrieval pipeline.
#[derive(Clone)]
pub struct HybridRetriever {
    semantic: SemanticRetriever,
    lexical: LexicalRetriever,
    reranker: CandidateReranker,
    config: RetrievalConfig,
}

impl std::fmt::Debug for HybridRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridRetriever")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HybridRetriever {
    pub fn new(
        encoder: Arc<dyn QueryEncoder>,
        store: Arc<dyn CorpusStore>,
        scorer: Arc<dyn PairScorer>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            semantic: SemanticRetriever::new(encoder, Arc::clone(&store)),
            lexical: LexicalRetriever::new(store),
            reranker: CandidateReranker::new(scorer),
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Semantic-only top `k`.
    pub async fn semantic_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Passage>, RetrievalError> {
        self.semantic.search(query, k).await
    }

    /// BM25-only top `k`.
    pub async fn lexical_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Passage>, RetrievalError> {
        self.lexical.search(query, k).await
    }

    /// Both retrievers at depth `k`, fused (up to `2k` candidates).
    pub async fn fused_candidates(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        let semantic = self.semantic.search(query, k).await?;
        let lexical = self.lexical.search(query, k).await?;
        Ok(merge(semantic, lexical))
    }

    /// Fused candidates at depth `k`, reranked to `rerank_top_k` with the given document cutoff.
    ///
    /// Retrieval failures propagate; reranker failures yield an empty set.
    pub async fn reranked(
        &self,
        query: &str,
        k: usize,
        score_cutoff: f32,
    ) -> Result<Vec<ScoredCandidate>, RetrievalError> {
        let candidates = self.fused_candidates(query, k).await?;
        Ok(self
            .reranker
            .rerank(query, candidates, self.config.rerank_top_k, score_cutoff))
    }

    /// Full pipeline with the configured depth and cutoff.
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredCandidate>, RetrievalError> {
        let started = Instant::now();
        let results = self
            .reranked(query, self.config.retrieval_k, self.config.score_cutoff)
            .await?;

        debug!(
            query_id = query_fingerprint(query),
            results = results.len(),
            top_score = results.first().map(|c| c.rerank_score),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Policy search complete"
        );

        Ok(results)
    }

    /// Policy lookup: formatted passages, the empty sentinel, or the error sentinel. Never fails.
    pub async fn lookup(&self, query: &str) -> String {
        match self.search(query).await {
            Ok(results) => format_passages(&results),
            Err(e) => {
                warn!(query_id = query_fingerprint(query), error = %e, "Policy lookup failed");
                format_error(e)
            }
        }
    }
}

/// Lazily built production services shared by every request.
#[derive(Debug, Clone)]
pub struct PipelineServices {
    pub encoder: Arc<EncoderService>,
    pub store: Arc<QdrantCorpusStore>,
    pub reranker: Arc<RerankerService>,
}

/// Which shared services have been constructed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub encoder_loaded: bool,
    pub encoder_stub: bool,
    pub reranker_loaded: bool,
    pub reranker_stub: bool,
    pub store_connected: bool,
}

impl Readiness {
    /// All three services have been built.
    pub fn is_ready(&self) -> bool {
        self.encoder_loaded && self.reranker_loaded && self.store_connected
    }
}

impl PipelineServices {
    /// Creates the handles; nothing is loaded or connected until first use.
    pub fn from_config(config: &Config) -> Self {
        info!(
            qdrant_url = %config.qdrant_url,
            collection = %config.collection,
            encoder_stub = config.encoder_path.is_none(),
            reranker_stub = config.reranker_path.is_none(),
            "Pipeline services configured"
        );

        Self {
            encoder: Arc::new(EncoderService::new(config.encoder_config())),
            store: Arc::new(QdrantCorpusStore::new(
                config.qdrant_url.clone(),
                config.collection.clone(),
            )),
            reranker: Arc::new(RerankerService::new(config.reranker_config())),
        }
    }

    /// Builds the pipeline over these services.
    pub fn retriever(&self, config: RetrievalConfig) -> HybridRetriever {
        HybridRetriever::new(
            self.encoder.clone(),
            self.store.clone(),
            self.reranker.clone(),
            config,
        )
    }

    /// Loads both models and connects to the store ahead of the first query.
    pub async fn warm_up(&self) -> Result<Readiness, RetrievalError> {
        let started = Instant::now();
        self.encoder.get()?;
        self.reranker.get()?;
        self.store.connect().await?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline services warmed up"
        );
        Ok(self.readiness())
    }

    pub fn readiness(&self) -> Readiness {
        Readiness {
            encoder_loaded: self.encoder.is_loaded(),
            encoder_stub: self.encoder.is_stub(),
            reranker_loaded: self.reranker.is_loaded(),
            reranker_stub: self.reranker.is_stub(),
            store_connected: self.store.is_connected(),
        }
    }
}
