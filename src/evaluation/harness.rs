use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::dataset::TestCase;
use super::error::EvaluationError;
use super::judge::{JudgeRequest, RelevanceJudge, judge_or_fallback};
use super::metrics::{first_relevant, ndcg, noise_robustness, precision, recall_at, reciprocal_rank};
use super::report::EvaluationReport;
use super::types::{AnswerableOutcome, EvaluationConfig, Mode, ModeResult, Scorecard};
use crate::hashing::query_fingerprint;
use crate::pipeline::HybridRetriever;
use crate::retrieval::RetrievalError;
use crate::scoring::AbstentionGate;

/// Judges an answerable case's retrieved texts.
///
/// Recall asks the judge once per (reference context, candidate) pair within the top
/// `max(k_values)`, stopping at the first match. Precision, MRR and NDCG share one verdict per
/// retrieved text.
pub async fn judge_answerable(
    judge: &dyn RelevanceJudge,
    case: &TestCase,
    retrieved: &[String],
    k_values: &[usize],
) -> AnswerableOutcome {
    let max_k = k_values.iter().copied().max().unwrap_or(0);
    let window = &retrieved[..retrieved.len().min(max_k)];

    let mut hits = Vec::with_capacity(case.reference_contexts.len());
    for context in &case.reference_contexts {
        let mut hit = None;
        for (rank, candidate) in window.iter().enumerate() {
            let request =
                JudgeRequest::answerable(&case.question, &case.reference_answer, candidate)
                    .with_reference_context(context);
            if judge_or_fallback(judge, &request).await {
                hit = Some(rank);
                break;
            }
        }
        hits.push(hit);
    }

    let mut verdicts = Vec::with_capacity(retrieved.len());
    for candidate in retrieved {
        let request = JudgeRequest::answerable(&case.question, &case.reference_answer, candidate);
        verdicts.push(judge_or_fallback(judge, &request).await);
    }

    debug!(
        hits = ?hits,
        first_relevant = ?first_relevant(&verdicts),
        "Judged answerable case"
    );

    AnswerableOutcome {
        recall: k_values.iter().map(|&k| (k, recall_at(&hits, k))).collect(),
        precision: precision(&verdicts),
        reciprocal_rank: reciprocal_rank(&verdicts),
        ndcg: ndcg(&verdicts),
    }
}

/// Noise robustness of an unanswerable case over its top `depth` texts.
pub async fn judge_unanswerable(
    judge: &dyn RelevanceJudge,
    case: &TestCase,
    retrieved: &[String],
    depth: usize,
) -> f64 {
    let mut verdicts = Vec::with_capacity(depth);
    for candidate in retrieved.iter().take(depth) {
        let request = JudgeRequest::unanswerable(&case.question, candidate);
        let relevant = judge_or_fallback(judge, &request).await;
        verdicts.push(relevant);
        if relevant {
            break;
        }
    }
    noise_robustness(&verdicts)
}

/// Replays the pipeline in every [`Mode`] over a labeled dataset.
pub struct EvaluationHarness {
    retriever: HybridRetriever,
    judge: Arc<dyn RelevanceJudge>,
    config: EvaluationConfig,
}

impl std::fmt::Debug for EvaluationHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationHarness")
            .field("judge", &self.judge.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EvaluationHarness {
    pub fn new(
        retriever: HybridRetriever,
        judge: Arc<dyn RelevanceJudge>,
        config: EvaluationConfig,
    ) -> Result<Self, EvaluationError> {
        config
            .validate()
            .map_err(|reason| EvaluationError::InvalidConfig { reason })?;
        Ok(Self {
            retriever,
            judge,
            config,
        })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Retrieved texts for `query` under `mode`, at most `k`.
    pub async fn retrieve(
        &self,
        mode: Mode,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, RetrievalError> {
        let texts = match mode {
            Mode::Semantic => into_texts(self.retriever.semantic_search(query, k).await?),
            Mode::Lexical => into_texts(self.retriever.lexical_search(query, k).await?),
            Mode::Fused => self
                .retriever
                .fused_candidates(query, k)
                .await?
                .into_iter()
                .take(k)
                .map(|c| c.passage.text)
                .collect(),
            Mode::Reranked => {
                let reranked = self
                    .retriever
                    .reranked(query, k, self.config.score_cutoff)
                    .await?;
                let (kept, outcome) =
                    AbstentionGate::new(self.config.overlay_threshold).apply(reranked);
                debug!(query_id = query_fingerprint(query), %outcome, "Abstention overlay");
                kept.into_iter().map(|c| c.passage.text).collect()
            }
        };
        Ok(texts)
    }

    /// Runs every mode, warming up before the first when configured.
    pub async fn run(&self, cases: &[TestCase]) -> Result<EvaluationReport, EvaluationError> {
        if cases.is_empty() {
            return Err(EvaluationError::EmptyDataset);
        }

        let mut modes = Vec::with_capacity(Mode::ALL.len());
        for (i, mode) in Mode::ALL.into_iter().enumerate() {
            let warmup = self.config.warmup && i == 0;
            modes.push(self.run_mode(mode, cases, warmup).await);
        }

        Ok(EvaluationReport::new(
            self.config.k_values.clone(),
            cases,
            modes,
        ))
    }

    /// Evaluates one mode. Per-query retrieval failures are counted, never propagated.
    pub async fn run_mode(&self, mode: Mode, cases: &[TestCase], warmup: bool) -> ModeResult {
        let k_values = &self.config.k_values;
        let max_k = self.config.max_k();
        let mut scores = Scorecard::new(k_values);

        info!(mode = %mode, cases = cases.len(), max_k, "Evaluating retrieval mode");

        if warmup && let Some(first) = cases.first() {
            match self.retrieve(mode, &first.question, max_k).await {
                Ok(_) => debug!(mode = %mode, "Warm-up query complete"),
                Err(e) => debug!(mode = %mode, error = %e, "Warm-up query failed, ignoring"),
            }
        }

        for (i, case) in cases.iter().enumerate() {
            let query_id = query_fingerprint(&case.question);
            let answerable = case.is_answerable();

            let started = Instant::now();
            let retrieved = match self.retrieve(mode, &case.question, max_k).await {
                Ok(texts) => texts,
                Err(e) => {
                    warn!(
                        mode = %mode,
                        case = i + 1,
                        query_id,
                        error = %e,
                        "Retrieval failed, recording worst-case metrics"
                    );
                    scores.record_failure(answerable);
                    continue;
                }
            };
            scores.add_latency(started.elapsed());

            if answerable {
                let outcome =
                    judge_answerable(self.judge.as_ref(), case, &retrieved, k_values).await;
                debug!(
                    mode = %mode,
                    case = i + 1,
                    query_id,
                    retrieved = retrieved.len(),
                    recall = ?outcome.recall,
                    precision = outcome.precision,
                    mrr = outcome.reciprocal_rank,
                    ndcg = outcome.ndcg,
                    "Answerable case"
                );
                scores.record_answerable(&outcome);
            } else {
                let nr = judge_unanswerable(
                    self.judge.as_ref(),
                    case,
                    &retrieved,
                    self.config.min_k(),
                )
                .await;
                debug!(
                    mode = %mode,
                    case = i + 1,
                    query_id,
                    retrieved = retrieved.len(),
                    noise_robustness = nr,
                    "Unanswerable case"
                );
                scores.record_unanswerable(nr);
            }
        }

        info!(
            mode = %mode,
            precision = scores.precision(),
            mrr = scores.mrr(),
            ndcg = scores.ndcg(),
            noise_robustness = scores.noise_robustness(),
            failures = scores.failures,
            avg_latency_secs = scores.avg_latency_secs(),
            "Mode evaluated"
        );

        ModeResult { mode, scores }
    }
}

fn into_texts(passages: Vec<crate::corpus::Passage>) -> Vec<String> {
    passages.into_iter().map(|p| p.text).collect()
}
