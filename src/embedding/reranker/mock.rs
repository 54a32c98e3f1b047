use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{PairScorer, RerankerError};

/// Scores candidates from a fixed text → score table.
#[derive(Debug, Default)]
pub struct MockPairScorer {
    scores: HashMap<String, f32>,
    default_score: f32,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockPairScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores `candidate` (trimmed) as `score` for every query.
    pub fn with_score(mut self, candidate: &str, score: f32) -> Self {
        self.scores.insert(candidate.trim().to_string(), score);
        self
    }

    /// Score for candidates not in the table.
    pub fn with_default_score(mut self, score: f32) -> Self {
        self.default_score = score;
        self
    }

    /// Makes every call fail with an inference error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `score` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PairScorer for MockPairScorer {
    fn score(&self, _query: &str, candidate: &str) -> Result<f32, RerankerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(RerankerError::InferenceFailed {
                reason: "mock scorer failure".to_string(),
            });
        }

        Ok(self
            .scores
            .get(candidate.trim())
            .copied()
            .unwrap_or(self.default_score))
    }
}
