//! The two confidence gates.
//!
//! [`DocumentCutoff`] filters individual candidates inside the reranker. [`AbstentionGate`] looks
//! at an already reranked set and keeps or discards it as a whole. They are deliberately separate:
//! the threshold sweep re-applies only the abstention gate to one cached rerank pass.

use tracing::debug;

use super::types::{GateOutcome, ScoredCandidate};

/// Drops candidates scoring strictly below `cutoff`; a score equal to it survives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentCutoff {
    pub cutoff: f32,
}

impl DocumentCutoff {
    pub fn new(cutoff: f32) -> Self {
        Self { cutoff }
    }

    pub fn admits(&self, score: f32) -> bool {
        score >= self.cutoff
    }

    pub fn apply(&self, candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        let before = candidates.len();
        let kept: Vec<_> = candidates
            .into_iter()
            .filter(|c| self.admits(c.rerank_score))
            .collect();

        debug!(
            cutoff = self.cutoff,
            kept = kept.len(),
            dropped = before - kept.len(),
            "Applied document cutoff"
        );

        kept
    }
}

/// Discards a whole reranked set when its top score is below `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbstentionGate {
    pub threshold: f32,
}

impl AbstentionGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Classifies a set sorted by score descending.
    pub fn evaluate(&self, ranked: &[ScoredCandidate]) -> GateOutcome {
        match ranked.first() {
            None => GateOutcome::Empty,
            Some(top) if top.rerank_score < self.threshold => GateOutcome::Abstained {
                top_score: top.rerank_score,
            },
            Some(top) => GateOutcome::Passed {
                top_score: top.rerank_score,
            },
        }
    }

    /// Returns the set unchanged or empty, plus the decision.
    pub fn apply(&self, ranked: Vec<ScoredCandidate>) -> (Vec<ScoredCandidate>, GateOutcome) {
        let outcome = self.evaluate(&ranked);
        debug!(threshold = self.threshold, %outcome, "Abstention gate");

        if outcome.is_abstained() {
            (Vec::new(), outcome)
        } else {
            (ranked, outcome)
        }
    }
}
