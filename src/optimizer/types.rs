use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluation::Scorecard;

/// Metrics at one abstention threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    pub threshold: f32,
    pub scores: Scorecard,
    /// `alpha * Recall@k + (1 - alpha) * NoiseRobustness`.
    pub combined_score: f64,
    /// Queries whose whole result set the overlay discarded.
    pub rejected_queries: usize,
    pub rejection_rate: f64,
}

/// Weighted objective balancing recall against abstention quality.
pub fn combined_score(alpha: f32, recall: f64, noise_robustness: f64) -> f64 {
    let alpha = f64::from(alpha);
    alpha * recall + (1.0 - alpha) * noise_robustness
}

/// Index of the highest combined score; ties keep the earliest threshold.
pub fn select_best(results: &[ThresholdResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, r)| match best {
            Some((_, score)) if score >= r.combined_score => best,
            _ => Some((i, r.combined_score)),
        })
        .map(|(i, _)| i)
}

/// Direction a metric moves as the threshold rises, comparing the first and last sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

impl Trend {
    pub fn between(first: f64, last: f64) -> Self {
        if last > first {
            Trend::Rising
        } else if last < first {
            Trend::Falling
        } else {
            Trend::Flat
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Rising => write!(f, "rises as the threshold increases"),
            Trend::Falling => write!(f, "falls as the threshold increases"),
            Trend::Flat => write!(f, "is unaffected by the threshold"),
        }
    }
}
