use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::OptimizerConfig;
use super::types::{ThresholdResult, Trend};
use crate::evaluation::EvaluationError;
use crate::evaluation::report::{write_file, write_pair};

/// Width of the suggested tuning range around the optimum.
const TUNING_RANGE: f32 = 0.1;

/// Per-metric series over the swept thresholds, ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCurves {
    pub thresholds: Vec<f32>,
    /// Recall@k series, keyed by k.
    pub recall: BTreeMap<usize, Vec<f64>>,
    pub noise_robustness: Vec<f64>,
    pub combined_score: Vec<f64>,
    pub rejection_rate: Vec<f64>,
    pub best_threshold: Option<f32>,
}

/// Outcome of a threshold sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub alpha: f32,
    pub k_values: Vec<usize>,
    /// Depth whose recall enters the objective.
    pub objective_k: usize,
    pub total_cases: usize,
    /// One entry per threshold, in sweep order.
    pub results: Vec<ThresholdResult>,
    pub best_index: usize,
}

impl SweepReport {
    pub fn new(
        config: &OptimizerConfig,
        total_cases: usize,
        results: Vec<ThresholdResult>,
        best_index: usize,
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            alpha: config.alpha,
            k_values: config.k_values.clone(),
            objective_k: config.objective_k(),
            total_cases,
            results,
            best_index,
        }
    }

    /// Threshold with the highest combined score.
    pub fn best(&self) -> Option<&ThresholdResult> {
        self.results.get(self.best_index)
    }

    /// Threshold maximizing objective recall.
    pub fn favor_recall(&self) -> Option<&ThresholdResult> {
        self.first_max_by(|r| r.scores.recall_at(self.objective_k))
    }

    /// Threshold maximizing noise robustness (lowest hallucination risk).
    pub fn favor_precision(&self) -> Option<&ThresholdResult> {
        self.first_max_by(|r| r.scores.noise_robustness())
    }

    pub fn recall_trend(&self) -> Trend {
        self.trend(|r| r.scores.recall_at(self.objective_k))
    }

    pub fn noise_trend(&self) -> Trend {
        self.trend(|r| r.scores.noise_robustness())
    }

    /// Suggested `(lower, upper)` ranges when recall or hallucination needs attention.
    pub fn tuning_ranges(&self) -> Option<((f32, f32), (f32, f32))> {
        let t = self.best()?.threshold;
        Some(((t - TUNING_RANGE, t), (t, t + TUNING_RANGE)))
    }

    fn first_max_by(&self, metric: impl Fn(&ThresholdResult) -> f64) -> Option<&ThresholdResult> {
        self.results.iter().fold(None, |best, r| match best {
            Some(b) if metric(b) >= metric(r) => Some(b),
            _ => Some(r),
        })
    }

    fn trend(&self, metric: impl Fn(&ThresholdResult) -> f64) -> Trend {
        match (self.results.first(), self.results.last()) {
            (Some(first), Some(last)) => Trend::between(metric(first), metric(last)),
            _ => Trend::Flat,
        }
    }

    /// Metric series against the threshold: recall per k, noise robustness, combined score and
    /// rejection rate.
    pub fn curves(&self) -> ThresholdCurves {
        ThresholdCurves {
            thresholds: self.results.iter().map(|r| r.threshold).collect(),
            recall: self
                .k_values
                .iter()
                .map(|&k| (k, self.series(|r| r.scores.recall_at(k))))
                .collect(),
            noise_robustness: self.series(|r| r.scores.noise_robustness()),
            combined_score: self.series(|r| r.combined_score),
            rejection_rate: self.series(|r| r.rejection_rate),
            best_threshold: self.best().map(|r| r.threshold),
        }
    }

    fn series(&self, metric: impl Fn(&ThresholdResult) -> f64) -> Vec<f64> {
        self.results.iter().map(metric).collect()
    }

    /// Writes the plotting series as `threshold_curves.json` into `dir`.
    pub fn write_curves(&self, dir: &Path) -> Result<PathBuf, EvaluationError> {
        let json = serde_json::to_string_pretty(&self.curves())?;
        let path = write_file(dir, "threshold_curves.json", &json)?;
        info!(path = %path.display(), "Threshold curves written");
        Ok(path)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let k = self.objective_k;
        let recall_headers: Vec<String> =
            self.k_values.iter().map(|k| format!("Recall@{k}")).collect();

        let _ = writeln!(out, "# Abstention threshold sweep\n");
        let _ = writeln!(out, "- Generated: {}", self.generated_at);
        let _ = writeln!(out, "- Cases: {}", self.total_cases);
        let _ = writeln!(
            out,
            "- Objective: {:.2} x Recall@{k} + {:.2} x Noise robustness\n",
            self.alpha,
            1.0 - self.alpha
        );

        let Some(best) = self.best() else {
            let _ = writeln!(out, "No thresholds were evaluated.");
            return out;
        };

        let _ = writeln!(out, "## Optimal threshold: {:.2}\n", best.threshold);
        let _ = writeln!(out, "| Metric | Value |");
        let _ = writeln!(out, "|--------|-------|");
        for &kv in &self.k_values {
            let _ = writeln!(out, "| Recall@{kv} | {:.3} |", best.scores.recall_at(kv));
        }
        let _ = writeln!(out, "| Noise robustness | {:.3} |", best.scores.noise_robustness());
        let _ = writeln!(out, "| Combined score | {:.3} |", best.combined_score);
        let _ = writeln!(out, "| Rejection rate | {:.1}% |", best.rejection_rate * 100.0);
        let _ = writeln!(
            out,
            "| Avg latency (s) | {:.3} |",
            best.scores.avg_latency_secs()
        );

        let _ = writeln!(out, "\n## All thresholds\n");
        let _ = writeln!(
            out,
            "| Threshold | {} | Noise robustness | Combined | Rejected | Rejection rate |",
            recall_headers.join(" | ")
        );
        let _ = writeln!(
            out,
            "|-----------|{}|------------------|----------|----------|----------------|",
            "----------|".repeat(self.k_values.len())
        );
        for r in &self.results {
            let recalls: Vec<String> = self
                .k_values
                .iter()
                .map(|&kv| format!("{:.3}", r.scores.recall_at(kv)))
                .collect();
            let _ = writeln!(
                out,
                "| {:.2} | {} | {:.3} | {:.3} | {} | {:.1}% |",
                r.threshold,
                recalls.join(" | "),
                r.scores.noise_robustness(),
                r.combined_score,
                r.rejected_queries,
                r.rejection_rate * 100.0
            );
        }

        let _ = writeln!(out, "\n## Trends\n");
        let _ = writeln!(out, "- Recall@{k} {}.", self.recall_trend());
        let _ = writeln!(out, "- Noise robustness {}.", self.noise_trend());
        for (label, other) in [
            ("lowest", self.results.first()),
            ("highest", self.results.last()),
        ] {
            if let Some(other) = other {
                let _ = writeln!(
                    out,
                    "- Versus the {label} threshold ({:.2}): Recall@{k} {:+.3}, noise robustness {:+.3}.",
                    other.threshold,
                    best.scores.recall_at(k) - other.scores.recall_at(k),
                    best.scores.noise_robustness() - other.scores.noise_robustness()
                );
            }
        }

        let _ = writeln!(out, "\n## Recommendations\n");
        let _ = writeln!(
            out,
            "- **Balanced**: {:.2} (Recall@{k} {:.3}, noise robustness {:.3})",
            best.threshold,
            best.scores.recall_at(k),
            best.scores.noise_robustness()
        );
        if let Some(r) = self.favor_recall() {
            let _ = writeln!(
                out,
                "- **Favor recall**: {:.2} (Recall@{k} {:.3}, noise robustness {:.3})",
                r.threshold,
                r.scores.recall_at(k),
                r.scores.noise_robustness()
            );
        }
        if let Some(r) = self.favor_precision() {
            let _ = writeln!(
                out,
                "- **Favor precision**: {:.2} (Recall@{k} {:.3}, noise robustness {:.3})",
                r.threshold,
                r.scores.recall_at(k),
                r.scores.noise_robustness()
            );
        }
        if let Some(((lo_a, lo_b), (hi_a, hi_b))) = self.tuning_ranges() {
            let _ = writeln!(
                out,
                "- If recall is too low, try {lo_a:.2} to {lo_b:.2}; if answers hallucinate, try {hi_a:.2} to {hi_b:.2}."
            );
        }

        out
    }

    pub fn to_json(&self) -> Result<String, EvaluationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes `threshold_sweep.md` and `threshold_sweep.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf), EvaluationError> {
        let paths = write_pair(dir, "threshold_sweep", &self.to_markdown(), &self.to_json()?)?;
        info!(markdown = %paths.0.display(), json = %paths.1.display(), "Sweep report written");
        Ok(paths)
    }
}
