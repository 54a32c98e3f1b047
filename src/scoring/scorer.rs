use std::sync::Arc;

use tracing::{debug, warn};

use crate::embedding::PairScorer;
use crate::retrieval::Candidate;

use super::error::ScoringError;
use super::gate::DocumentCutoff;
use super::types::ScoredCandidate;

/// Second-stage reranker: cross-encoder scoring, sort, truncate, document cutoff.
#[derive(Clone)]
pub struct CandidateReranker {
    scorer: Arc<dyn PairScorer>,
}

impl std::fmt::Debug for CandidateReranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateReranker").finish_non_exhaustive()
    }
}

impl CandidateReranker {
    pub fn new(scorer: Arc<dyn PairScorer>) -> Self {
        Self { scorer }
    }

    /// Scores every candidate, in input order. A NaN score is recorded as negative infinity.
    pub fn score_candidates(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<ScoredCandidate>, ScoringError> {
        candidates
            .into_iter()
            .map(|candidate| {
                let mut score = self.scorer.score(query, candidate.text())?;
                if score.is_nan() {
                    warn!(source = %candidate.passage.source, "Cross-encoder returned NaN score");
                    score = f32::NEG_INFINITY;
                }
                Ok(ScoredCandidate::new(candidate, score))
            })
            .collect()
    }

    /// Scores, sorts descending (stable), keeps `top_k`, then drops scores below `score_cutoff`.
    pub fn try_rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
        score_cutoff: f32,
    ) -> Result<Vec<ScoredCandidate>, ScoringError> {
        if candidates.is_empty() {
            debug!("No candidates to rerank");
            return Ok(Vec::new());
        }

        let total = candidates.len();
        let mut scored = self.score_candidates(query, candidates)?;

        scored.sort_by(|a, b| b.rerank_score.total_cmp(&a.rerank_score));
        scored.truncate(top_k);

        let survivors = DocumentCutoff::new(score_cutoff).apply(scored);

        debug!(
            query_len = query.len(),
            candidates = total,
            top_k,
            survivors = survivors.len(),
            top_score = survivors.first().map(|c| c.rerank_score),
            "Reranking complete"
        );

        Ok(survivors)
    }

    /// Like [`try_rerank`](Self::try_rerank), but a scorer failure yields no survivors.
    pub fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
        score_cutoff: f32,
    ) -> Vec<ScoredCandidate> {
        match self.try_rerank(query, candidates, top_k, score_cutoff) {
            Ok(survivors) => survivors,
            Err(e) => {
                warn!(error = %e, "Reranker failed, returning no candidates");
                Vec::new()
            }
        }
    }
}
