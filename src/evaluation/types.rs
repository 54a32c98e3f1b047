use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::metrics::mean;
use crate::constants::{DEFAULT_K_VALUES, DEFAULT_SCORE_CUTOFF};

/// The four ways the harness replays retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Nearest-neighbour search only.
    Semantic,
    /// BM25 only.
    Lexical,
    /// Both retrievers fused, truncated to `k`, no reranking.
    Fused,
    /// Fused, reranked, document cutoff and abstention overlay applied.
    Reranked,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Semantic, Mode::Lexical, Mode::Fused, Mode::Reranked];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Semantic => "semantic only",
            Mode::Lexical => "lexical (BM25) only",
            Mode::Fused => "hybrid (no rerank)",
            Mode::Reranked => "hybrid + rerank",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Harness settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// `Recall@k` depths. Retrieval always runs at the largest.
    pub k_values: Vec<usize>,
    /// Issue one throwaway query before the first mode.
    pub warmup: bool,
    /// Document cutoff for the reranked mode.
    pub score_cutoff: f32,
    /// Abstention threshold for the reranked mode.
    pub overlay_threshold: f32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            k_values: DEFAULT_K_VALUES.to_vec(),
            warmup: true,
            score_cutoff: DEFAULT_SCORE_CUTOFF,
            overlay_threshold: DEFAULT_SCORE_CUTOFF,
        }
    }
}

impl EvaluationConfig {
    /// Sorts and deduplicates the depths.
    pub fn with_k_values(mut self, k_values: impl IntoIterator<Item = usize>) -> Self {
        let mut k_values: Vec<usize> = k_values.into_iter().collect();
        k_values.sort_unstable();
        k_values.dedup();
        self.k_values = k_values;
        self
    }

    pub fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    /// Sets both the document cutoff and the abstention threshold.
    pub fn with_score_cutoff(mut self, cutoff: f32) -> Self {
        self.score_cutoff = cutoff;
        self.overlay_threshold = cutoff;
        self
    }

    pub fn with_overlay_threshold(mut self, threshold: f32) -> Self {
        self.overlay_threshold = threshold;
        self
    }

    pub fn max_k(&self) -> usize {
        self.k_values.iter().copied().max().unwrap_or(0)
    }

    pub fn min_k(&self) -> usize {
        self.k_values.iter().copied().min().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.k_values.is_empty() {
            return Err("at least one k value is required".to_string());
        }
        if self.k_values.contains(&0) {
            return Err("k values must be at least 1".to_string());
        }
        if !self.score_cutoff.is_finite() || !self.overlay_threshold.is_finite() {
            return Err("cutoffs must be finite".to_string());
        }
        Ok(())
    }
}

/// Judged metrics for one answerable case.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnswerableOutcome {
    pub recall: BTreeMap<usize, f64>,
    pub precision: f64,
    pub reciprocal_rank: f64,
    pub ndcg: f64,
}

impl AnswerableOutcome {
    /// All-zero outcome recorded for a failed query.
    pub fn zeros(k_values: &[usize]) -> Self {
        Self {
            recall: k_values.iter().map(|&k| (k, 0.0)).collect(),
            ..Self::default()
        }
    }
}

/// Per-case metric lists plus counters, shared by evaluation modes and sweep thresholds.
///
/// Ranking metrics cover only answerable cases; noise robustness only unanswerable ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub recall_scores: BTreeMap<usize, Vec<f64>>,
    pub precision_scores: Vec<f64>,
    pub mrr_scores: Vec<f64>,
    pub ndcg_scores: Vec<f64>,
    pub noise_scores: Vec<f64>,
    pub answerable: usize,
    pub unanswerable: usize,
    pub failures: usize,
    pub total_latency_secs: f64,
}

impl Scorecard {
    pub fn new(k_values: &[usize]) -> Self {
        Self {
            recall_scores: k_values.iter().map(|&k| (k, Vec::new())).collect(),
            ..Self::default()
        }
    }

    pub fn record_answerable(&mut self, outcome: &AnswerableOutcome) {
        self.answerable += 1;
        for (k, scores) in self.recall_scores.iter_mut() {
            scores.push(outcome.recall.get(k).copied().unwrap_or(0.0));
        }
        self.precision_scores.push(outcome.precision);
        self.mrr_scores.push(outcome.reciprocal_rank);
        self.ndcg_scores.push(outcome.ndcg);
    }

    pub fn record_unanswerable(&mut self, noise_robustness: f64) {
        self.unanswerable += 1;
        self.noise_scores.push(noise_robustness);
    }

    /// Counts a failed query and records worst-case metrics for it.
    pub fn record_failure(&mut self, answerable: bool) {
        self.failures += 1;
        if answerable {
            let zeros = AnswerableOutcome::zeros(&self.k_values());
            self.record_answerable(&zeros);
        } else {
            self.record_unanswerable(0.0);
        }
    }

    pub fn add_latency(&mut self, elapsed: Duration) {
        self.total_latency_secs += elapsed.as_secs_f64();
    }

    pub fn k_values(&self) -> Vec<usize> {
        self.recall_scores.keys().copied().collect()
    }

    pub fn total(&self) -> usize {
        self.answerable + self.unanswerable
    }

    /// Mean `Recall@k`, `0.0` when `k` was not evaluated.
    pub fn recall_at(&self, k: usize) -> f64 {
        self.recall_scores.get(&k).map_or(0.0, |s| mean(s))
    }

    pub fn precision(&self) -> f64 {
        mean(&self.precision_scores)
    }

    pub fn mrr(&self) -> f64 {
        mean(&self.mrr_scores)
    }

    pub fn ndcg(&self) -> f64 {
        mean(&self.ndcg_scores)
    }

    pub fn noise_robustness(&self) -> f64 {
        mean(&self.noise_scores)
    }

    /// Mean latency over every case, failures included.
    pub fn avg_latency_secs(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.total_latency_secs / n as f64,
        }
    }

    pub fn success_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => n.saturating_sub(self.failures) as f64 / n as f64,
        }
    }
}

/// One mode's aggregated results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeResult {
    pub mode: Mode,
    pub scores: Scorecard,
}
