use std::time::Duration;

use crate::constants::{
    DEFAULT_ALPHA, DEFAULT_K_VALUES, DEFAULT_SWEEP_PACING_MS, DEFAULT_SWEEP_THRESHOLDS,
    OBJECTIVE_RECALL_K,
};

/// Threshold sweep settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Abstention thresholds, evaluated in this order.
    pub thresholds: Vec<f32>,
    /// Recall weight of the combined objective.
    pub alpha: f32,
    pub k_values: Vec<usize>,
    /// Delay between successive sweeps that consulted the judge.
    pub pacing: Duration,
    /// Document cutoff for the single reranking pass. `None` keeps every reranked candidate.
    pub document_cutoff: Option<f32>,
    pub warmup: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_SWEEP_THRESHOLDS.to_vec(),
            alpha: DEFAULT_ALPHA,
            k_values: DEFAULT_K_VALUES.to_vec(),
            pacing: Duration::from_millis(DEFAULT_SWEEP_PACING_MS),
            document_cutoff: None,
            warmup: true,
        }
    }
}

impl OptimizerConfig {
    pub fn with_thresholds(mut self, thresholds: impl IntoIterator<Item = f32>) -> Self {
        self.thresholds = thresholds.into_iter().collect();
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sorts and deduplicates the depths.
    pub fn with_k_values(mut self, k_values: impl IntoIterator<Item = usize>) -> Self {
        let mut k_values: Vec<usize> = k_values.into_iter().collect();
        k_values.sort_unstable();
        k_values.dedup();
        self.k_values = k_values;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_document_cutoff(mut self, cutoff: f32) -> Self {
        self.document_cutoff = Some(cutoff);
        self
    }

    pub fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn max_k(&self) -> usize {
        self.k_values.iter().copied().max().unwrap_or(0)
    }

    pub fn min_k(&self) -> usize {
        self.k_values.iter().copied().min().unwrap_or(0)
    }

    /// Depth whose recall enters the objective: 3 when evaluated, else the smallest depth.
    pub fn objective_k(&self) -> usize {
        if self.k_values.contains(&OBJECTIVE_RECALL_K) {
            OBJECTIVE_RECALL_K
        } else {
            self.min_k()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.thresholds.is_empty() {
            return Err("at least one threshold is required".to_string());
        }
        if self.thresholds.iter().any(|t| !t.is_finite()) {
            return Err("thresholds must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(format!("alpha must be within [0, 1], got {}", self.alpha));
        }
        if self.k_values.is_empty() || self.k_values.contains(&0) {
            return Err("k values must be non-empty and at least 1".to_string());
        }
        if self.document_cutoff.is_some_and(|c| !c.is_finite()) {
            return Err("document cutoff must be finite".to_string());
        }
        Ok(())
    }
}
