use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::dataset::TestCase;
use super::error::EvaluationError;
use super::types::{Mode, ModeResult};

/// Baseline vs. improved value of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub metric: String,
    pub baseline: f64,
    pub improved: f64,
}

impl Contribution {
    fn new(metric: impl Into<String>, baseline: f64, improved: f64) -> Self {
        Self {
            metric: metric.into(),
            baseline,
            improved,
        }
    }

    pub fn delta(&self) -> f64 {
        self.improved - self.baseline
    }

    /// Relative change in percent, `0.0` when the baseline is zero.
    pub fn delta_pct(&self) -> f64 {
        if self.baseline > 0.0 {
            self.delta() / self.baseline * 100.0
        } else {
            0.0
        }
    }
}

/// Results of one evaluation run across every mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub k_values: Vec<usize>,
    pub total_cases: usize,
    pub answerable: usize,
    pub unanswerable: usize,
    pub modes: Vec<ModeResult>,
}

impl EvaluationReport {
    pub fn new(k_values: Vec<usize>, cases: &[TestCase], modes: Vec<ModeResult>) -> Self {
        let answerable = cases.iter().filter(|c| c.is_answerable()).count();
        Self {
            generated_at: Utc::now().to_rfc3339(),
            k_values,
            total_cases: cases.len(),
            answerable,
            unanswerable: cases.len() - answerable,
            modes,
        }
    }

    pub fn mode(&self, mode: Mode) -> Option<&ModeResult> {
        self.modes.iter().find(|m| m.mode == mode)
    }

    /// Mode with the highest value of `metric`; ties keep the earlier mode.
    pub fn best_by(&self, metric: impl Fn(&ModeResult) -> f64) -> Option<&ModeResult> {
        self.modes.iter().fold(None, |best, m| match best {
            Some(b) if metric(b) >= metric(m) => Some(b),
            _ => Some(m),
        })
    }

    /// What adding BM25 to semantic retrieval buys, per `Recall@k`.
    pub fn lexical_contribution(&self) -> Vec<Contribution> {
        let (Some(semantic), Some(fused)) = (self.mode(Mode::Semantic), self.mode(Mode::Fused))
        else {
            return Vec::new();
        };
        self.k_values
            .iter()
            .map(|&k| {
                Contribution::new(
                    format!("Recall@{k}"),
                    semantic.scores.recall_at(k),
                    fused.scores.recall_at(k),
                )
            })
            .collect()
    }

    /// What reranking buys over plain fusion.
    pub fn rerank_contribution(&self) -> Vec<Contribution> {
        let (Some(fused), Some(reranked)) = (self.mode(Mode::Fused), self.mode(Mode::Reranked))
        else {
            return Vec::new();
        };
        let mut rows: Vec<Contribution> = self
            .k_values
            .iter()
            .map(|&k| {
                Contribution::new(
                    format!("Recall@{k}"),
                    fused.scores.recall_at(k),
                    reranked.scores.recall_at(k),
                )
            })
            .collect();
        rows.push(Contribution::new(
            "Precision",
            fused.scores.precision(),
            reranked.scores.precision(),
        ));
        rows.push(Contribution::new(
            "MRR",
            fused.scores.mrr(),
            reranked.scores.mrr(),
        ));
        rows.push(Contribution::new(
            "Noise robustness",
            fused.scores.noise_robustness(),
            reranked.scores.noise_robustness(),
        ));
        rows
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# Retrieval evaluation report\n");
        let _ = writeln!(out, "- Generated: {}", self.generated_at);
        let _ = writeln!(
            out,
            "- Cases: {} ({} answerable, {} unanswerable)\n",
            self.total_cases, self.answerable, self.unanswerable
        );

        let _ = writeln!(out, "## Retrieval quality (answerable cases)\n");
        let recall_headers: Vec<String> =
            self.k_values.iter().map(|k| format!("Recall@{k}")).collect();
        let _ = writeln!(
            out,
            "| Mode | {} | Precision | MRR | NDCG | Latency (s) | Failures |",
            recall_headers.join(" | ")
        );
        let _ = writeln!(
            out,
            "|------|{}|-----------|-----|------|-------------|----------|",
            "----------|".repeat(self.k_values.len())
        );
        for m in &self.modes {
            let recalls: Vec<String> = self
                .k_values
                .iter()
                .map(|&k| format!("{:.3}", m.scores.recall_at(k)))
                .collect();
            let _ = writeln!(
                out,
                "| {} | {} | {:.3} | {:.3} | {:.3} | {:.3} | {} |",
                m.mode,
                recalls.join(" | "),
                m.scores.precision(),
                m.scores.mrr(),
                m.scores.ndcg(),
                m.scores.avg_latency_secs(),
                m.scores.failures
            );
        }

        let _ = writeln!(out, "\n## Noise robustness (unanswerable cases)\n");
        let _ = writeln!(out, "| Mode | Unanswerable | Noise robustness | Success rate |");
        let _ = writeln!(out, "|------|--------------|------------------|--------------|");
        for m in &self.modes {
            let _ = writeln!(
                out,
                "| {} | {} | {:.3} | {:.1}% |",
                m.mode,
                m.scores.unanswerable,
                m.scores.noise_robustness(),
                m.scores.success_rate() * 100.0
            );
        }

        let _ = writeln!(out, "\n## Best mode per metric\n");
        for &k in &self.k_values {
            if let Some(best) = self.best_by(|m| m.scores.recall_at(k)) {
                let _ = writeln!(
                    out,
                    "- **Recall@{k}**: {} ({:.3})",
                    best.mode,
                    best.scores.recall_at(k)
                );
            }
        }
        let named: [(&str, fn(&ModeResult) -> f64); 4] = [
            ("Precision", |m| m.scores.precision()),
            ("MRR", |m| m.scores.mrr()),
            ("NDCG", |m| m.scores.ndcg()),
            ("Noise robustness", |m| m.scores.noise_robustness()),
        ];
        for (name, metric) in named {
            if let Some(best) = self.best_by(metric) {
                let _ = writeln!(out, "- **{name}**: {} ({:.3})", best.mode, metric(best));
            }
        }

        write_contribution(
            &mut out,
            "BM25 contribution (hybrid vs. semantic only)",
            &self.lexical_contribution(),
        );
        write_contribution(
            &mut out,
            "Reranker contribution (hybrid + rerank vs. hybrid)",
            &self.rerank_contribution(),
        );

        out
    }

    pub fn to_json(&self) -> Result<String, EvaluationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes `evaluation_report.md` and `evaluation_report.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf), EvaluationError> {
        let paths = write_pair(
            dir,
            "evaluation_report",
            &self.to_markdown(),
            &self.to_json()?,
        )?;
        info!(markdown = %paths.0.display(), json = %paths.1.display(), "Evaluation report written");
        Ok(paths)
    }
}

pub(crate) fn write_contribution(out: &mut String, title: &str, rows: &[Contribution]) {
    if rows.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n## {title}\n");
    let _ = writeln!(out, "| Metric | Baseline | With module | Delta | Delta % |");
    let _ = writeln!(out, "|--------|----------|-------------|-------|---------|");
    for row in rows {
        let _ = writeln!(
            out,
            "| {} | {:.3} | {:.3} | {:+.3} | {:+.1}% |",
            row.metric,
            row.baseline,
            row.improved,
            row.delta(),
            row.delta_pct()
        );
    }
}

/// Writes `{stem}.md` and `{stem}.json`, creating `dir` if needed.
pub(crate) fn write_pair(
    dir: &Path,
    stem: &str,
    markdown: &str,
    json: &str,
) -> Result<(PathBuf, PathBuf), EvaluationError> {
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;

    let md_path = dir.join(format!("{stem}.md"));
    std::fs::write(&md_path, markdown).map_err(io_err(&md_path))?;

    let json_path = dir.join(format!("{stem}.json"));
    std::fs::write(&json_path, json).map_err(io_err(&json_path))?;

    Ok((md_path, json_path))
}

/// Writes a single report file, creating `dir` if needed.
pub(crate) fn write_file(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, EvaluationError> {
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = dir.join(name);
    std::fs::write(&path, contents).map_err(io_err(&path))?;
    Ok(path)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> EvaluationError + use<> {
    let path = path.to_path_buf();
    move |source| EvaluationError::ReportWrite { path, source }
}
