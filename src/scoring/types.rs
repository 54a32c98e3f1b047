use serde::{Deserialize, Serialize};

use crate::corpus::Passage;
use crate::retrieval::{Candidate, Origin};

/// A candidate annotated with its cross-encoder score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub passage: Passage,
    pub origin: Origin,
    pub rerank_score: f32,
}

impl ScoredCandidate {
    pub fn new(candidate: Candidate, rerank_score: f32) -> Self {
        Self {
            passage: candidate.passage,
            origin: candidate.origin,
            rerank_score,
        }
    }

    pub fn text(&self) -> &str {
        &self.passage.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Decision of the abstention gate for one query.
pub enum GateOutcome {
    /// Top score reached the threshold; the set is returned.
    Passed {
        /// Best cross-encoder score.
        top_score: f32,
    },
    /// Top score fell below the threshold; the whole set is discarded.
    Abstained {
        /// Best cross-encoder score observed.
        top_score: f32,
    },
    /// Nothing survived reranking, so there was nothing to gate.
    Empty,
}

impl GateOutcome {
    /// Returns `true` if the set is kept.
    pub fn is_passed(&self) -> bool {
        matches!(self, GateOutcome::Passed { .. })
    }

    /// Returns `true` only when a non-empty set was discarded.
    pub fn is_abstained(&self) -> bool {
        matches!(self, GateOutcome::Abstained { .. })
    }

    pub fn top_score(&self) -> Option<f32> {
        match self {
            GateOutcome::Passed { top_score } | GateOutcome::Abstained { top_score } => {
                Some(*top_score)
            }
            GateOutcome::Empty => None,
        }
    }
}

impl std::fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateOutcome::Passed { top_score } => write!(f, "PASSED (top_score: {:.4})", top_score),
            GateOutcome::Abstained { top_score } => {
                write!(f, "ABSTAINED (top_score: {:.4})", top_score)
            }
            GateOutcome::Empty => write!(f, "EMPTY"),
        }
    }
}
