use crate::constants::{DEFAULT_RERANK_TOP_K, DEFAULT_RETRIEVAL_K, DEFAULT_SCORE_CUTOFF};

/// Depths and cutoff for one retrieve → fuse → rerank pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalConfig {
    /// Passages requested from each first-stage retriever.
    pub retrieval_k: usize,
    /// Candidates kept after reranking.
    pub rerank_top_k: usize,
    /// Per-document cutoff applied after truncation.
    pub score_cutoff: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            retrieval_k: DEFAULT_RETRIEVAL_K,
            rerank_top_k: DEFAULT_RERANK_TOP_K,
            score_cutoff: DEFAULT_SCORE_CUTOFF,
        }
    }
}

impl RetrievalConfig {
    pub fn with_retrieval_k(mut self, retrieval_k: usize) -> Self {
        self.retrieval_k = retrieval_k;
        self
    }

    pub fn with_rerank_top_k(mut self, rerank_top_k: usize) -> Self {
        self.rerank_top_k = rerank_top_k;
        self
    }

    pub fn with_score_cutoff(mut self, score_cutoff: f32) -> Self {
        self.score_cutoff = score_cutoff;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.retrieval_k == 0 {
            return Err("retrieval_k must be at least 1".to_string());
        }
        if self.rerank_top_k == 0 {
            return Err("rerank_top_k must be at least 1".to_string());
        }
        if !self.score_cutoff.is_finite() {
            return Err(format!(
                "score_cutoff must be finite, got {}",
                self.score_cutoff
            ));
        }
        Ok(())
    }
}
