//! Hard-negative diagnosis.
//!
//! For every unanswerable question, reranks with the overlay disabled and shows the strongest
//! distractor: its score, a preview, and whether the judge would have accepted it. Distractors
//! the judge accepts are what drag noise robustness down.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::dataset::TestCase;
use super::error::EvaluationError;
use super::judge::{HeuristicJudge, JudgeRequest, RelevanceJudge};
use super::report::write_pair;
use crate::hashing::query_fingerprint;
use crate::pipeline::HybridRetriever;

/// Characters of passage text shown per distractor.
pub const PREVIEW_CHARS: usize = 100;

/// What the top-1 rerank pass produced for one unanswerable question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Diagnosis {
    /// Retrieval failed.
    Failed { reason: String },
    /// Nothing survived reranking.
    Empty,
    /// Highest-scoring candidate and the judge's verdict on it.
    Distractor {
        score: f32,
        source: String,
        preview: String,
        judged_relevant: bool,
        /// The judge errored and the heuristic decided.
        fallback: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardNegative {
    pub question: String,
    #[serde(flatten)]
    pub diagnosis: Diagnosis,
}

impl HardNegative {
    /// The judge accepted the distractor as support.
    pub fn is_flagged(&self) -> bool {
        matches!(
            self.diagnosis,
            Diagnosis::Distractor {
                judged_relevant: true,
                ..
            }
        )
    }
}

/// First [`PREVIEW_CHARS`] characters on a single line.
pub fn preview(text: &str) -> String {
    let flat: String = text.trim().replace(['\n', '\r'], " ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Diagnoses every unanswerable case at retrieval depth `k`; answerable cases are skipped.
pub async fn diagnose_hard_negatives(
    retriever: &HybridRetriever,
    judge: &dyn RelevanceJudge,
    cases: &[TestCase],
    k: usize,
) -> Vec<HardNegative> {
    let mut out = Vec::new();

    for case in cases.iter().filter(|c| !c.is_answerable()) {
        let query_id = query_fingerprint(&case.question);
        let diagnosis = match retriever.reranked(&case.question, k, f32::NEG_INFINITY).await {
            Err(e) => {
                warn!(query_id, error = %e, "Hard-negative retrieval failed");
                Diagnosis::Failed {
                    reason: e.to_string(),
                }
            }
            Ok(ranked) => match ranked.into_iter().next() {
                None => Diagnosis::Empty,
                Some(top) => {
                    let request = JudgeRequest::unanswerable(&case.question, top.text());
                    let (judged_relevant, fallback) = match judge.judge(&request).await {
                        Ok(relevant) => (relevant, false),
                        Err(e) => {
                            warn!(query_id, error = %e, "Judge failed, using heuristic");
                            (HeuristicJudge::decide(&request), true)
                        }
                    };
                    Diagnosis::Distractor {
                        score: top.rerank_score,
                        source: top.passage.label(),
                        preview: preview(top.text()),
                        judged_relevant,
                        fallback,
                    }
                }
            },
        };

        info!(query_id, diagnosis = ?diagnosis, "Diagnosed hard negative");
        out.push(HardNegative {
            question: case.question.clone(),
            diagnosis,
        });
    }

    out
}

/// Hard-negative scan over a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardNegativeReport {
    pub generated_at: String,
    pub judge: String,
    pub cases: Vec<HardNegative>,
}

impl HardNegativeReport {
    pub fn new(judge: &str, cases: Vec<HardNegative>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            judge: judge.to_string(),
            cases,
        }
    }

    pub fn flagged(&self) -> usize {
        self.cases.iter().filter(|c| c.is_flagged()).count()
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Hard negative diagnosis\n");
        let _ = writeln!(out, "- Generated: {}", self.generated_at);
        let _ = writeln!(out, "- Judge: {}", self.judge);
        let _ = writeln!(out, "- Unanswerable questions: {}", self.cases.len());
        let _ = writeln!(out, "- Distractors judged relevant: {}\n", self.flagged());

        let _ = writeln!(out, "| # | Question | Top score | Source | Verdict | Preview |");
        let _ = writeln!(out, "|---|----------|-----------|--------|---------|---------|");
        for (i, case) in self.cases.iter().enumerate() {
            let question = escape_cell(&case.question);
            let row = match &case.diagnosis {
                Diagnosis::Failed { reason } => {
                    format!("| - | - | error: {} | - |", escape_cell(reason))
                }
                Diagnosis::Empty => "| - | - | no candidates | - |".to_string(),
                Diagnosis::Distractor {
                    score,
                    source,
                    preview,
                    judged_relevant,
                    fallback,
                } => {
                    let verdict = if *judged_relevant { "relevant" } else { "irrelevant" };
                    let suffix = if *fallback { " (heuristic)" } else { "" };
                    format!(
                        "| {score:.4} | {} | {verdict}{suffix} | {} |",
                        escape_cell(source),
                        escape_cell(preview)
                    )
                }
            };
            let _ = writeln!(out, "| {} | {} {}", i + 1, question, row);
        }

        out
    }

    pub fn to_json(&self) -> Result<String, EvaluationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes `hard_negatives.md` and `hard_negatives.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf), EvaluationError> {
        let paths = write_pair(dir, "hard_negatives", &self.to_markdown(), &self.to_json()?)?;
        info!(markdown = %paths.0.display(), json = %paths.1.display(), "Hard-negative report written");
        Ok(paths)
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
