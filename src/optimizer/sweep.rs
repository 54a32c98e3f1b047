use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::config::OptimizerConfig;
use super::report::SweepReport;
use super::types::{ThresholdResult, combined_score, select_best};
use crate::evaluation::{
    AnswerableOutcome, EvaluationError, RelevanceJudge, Scorecard, TestCase, judge_answerable,
    judge_unanswerable,
};
use crate::hashing::query_fingerprint;
use crate::pipeline::HybridRetriever;
use crate::scoring::{AbstentionGate, ScoredCandidate};

/// One case's single reranking pass, reused by every threshold.
struct CachedPass {
    case: usize,
    latency: Duration,
    outcome: Result<Vec<ScoredCandidate>, String>,
}

/// Judged metrics of a case whose result set survived the overlay.
enum Verdict {
    Answerable(AnswerableOutcome),
    Unanswerable(f64),
}

/// Sweeps the abstention overlay over one cached retrieval + rerank pass per case.
pub struct ThresholdOptimizer {
    retriever: HybridRetriever,
    judge: Arc<dyn RelevanceJudge>,
    config: OptimizerConfig,
}

impl std::fmt::Debug for ThresholdOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdOptimizer")
            .field("judge", &self.judge.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ThresholdOptimizer {
    pub fn new(
        retriever: HybridRetriever,
        judge: Arc<dyn RelevanceJudge>,
        config: OptimizerConfig,
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

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub async fn run(&self, cases: &[TestCase]) -> Result<SweepReport, EvaluationError> {
        if cases.is_empty() {
            return Err(EvaluationError::EmptyDataset);
        }

        let passes = self.retrieve_all(cases).await;
        let mut verdicts: Vec<Option<Verdict>> = cases.iter().map(|_| None).collect();
        let objective_k = self.config.objective_k();
        let mut results = Vec::with_capacity(self.config.thresholds.len());

        for (i, &threshold) in self.config.thresholds.iter().enumerate() {
            let judged_before = verdicts.iter().filter(|v| v.is_some()).count();
            let gate = AbstentionGate::new(threshold);
            let mut scores = Scorecard::new(&self.config.k_values);
            let mut rejected = 0;

            for pass in &passes {
                let case = &cases[pass.case];
                let answerable = case.is_answerable();
                let reranked = match &pass.outcome {
                    Ok(reranked) => reranked,
                    Err(_) => {
                        scores.record_failure(answerable);
                        continue;
                    }
                };
                scores.add_latency(pass.latency);

                if gate.evaluate(reranked).is_abstained() {
                    rejected += 1;
                    record_empty(&mut scores, &self.config.k_values, answerable);
                    continue;
                }
                if reranked.is_empty() {
                    record_empty(&mut scores, &self.config.k_values, answerable);
                    continue;
                }

                let verdict = match verdicts[pass.case].take() {
                    Some(v) => v,
                    None => self.judge_case(case, reranked).await,
                };
                match &verdict {
                    Verdict::Answerable(outcome) => scores.record_answerable(outcome),
                    Verdict::Unanswerable(nr) => scores.record_unanswerable(*nr),
                }
                verdicts[pass.case] = Some(verdict);
            }

            let recall = scores.recall_at(objective_k);
            let noise = scores.noise_robustness();
            let result = ThresholdResult {
                threshold,
                combined_score: combined_score(self.config.alpha, recall, noise),
                rejected_queries: rejected,
                rejection_rate: rejected as f64 / cases.len() as f64,
                scores,
            };

            info!(
                threshold,
                recall_k = objective_k,
                recall,
                noise_robustness = noise,
                combined_score = result.combined_score,
                rejected_queries = rejected,
                "Threshold evaluated"
            );
            results.push(result);

            let judged_now = verdicts.iter().filter(|v| v.is_some()).count();
            let more_to_come = i + 1 < self.config.thresholds.len();
            if more_to_come && judged_now > judged_before && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        let best = select_best(&results).unwrap_or(0);
        if let Some(best) = results.get(best) {
            info!(
                threshold = best.threshold,
                combined_score = best.combined_score,
                "Optimal threshold selected"
            );
        }

        Ok(SweepReport::new(&self.config, cases.len(), results, best))
    }

    async fn retrieve_all(&self, cases: &[TestCase]) -> Vec<CachedPass> {
        let max_k = self.config.max_k();
        let cutoff = self.config.document_cutoff.unwrap_or(f32::NEG_INFINITY);

        if self.config.warmup && let Some(first) = cases.first() {
            let _ = self.retriever.reranked(&first.question, max_k, cutoff).await;
            debug!("Warm-up query complete");
        }

        let mut passes = Vec::with_capacity(cases.len());
        for (i, case) in cases.iter().enumerate() {
            let started = Instant::now();
            let outcome = self
                .retriever
                .reranked(&case.question, max_k, cutoff)
                .await
                .map_err(|e| {
                    warn!(
                        case = i + 1,
                        query_id = query_fingerprint(&case.question),
                        error = %e,
                        "Retrieval failed, case counts as a failure at every threshold"
                    );
                    e.to_string()
                });
            debug!(
                case = i + 1,
                top_score = outcome.as_ref().ok().and_then(|r| r.first()).map(|c| c.rerank_score),
                "Cached reranking pass"
            );
            passes.push(CachedPass {
                case: i,
                latency: started.elapsed(),
                outcome,
            });
        }
        passes
    }

    async fn judge_case(&self, case: &TestCase, reranked: &[ScoredCandidate]) -> Verdict {
        let texts: Vec<String> = reranked.iter().map(|c| c.passage.text.clone()).collect();
        if case.is_answerable() {
            Verdict::Answerable(
                judge_answerable(self.judge.as_ref(), case, &texts, &self.config.k_values).await,
            )
        } else {
            Verdict::Unanswerable(
                judge_unanswerable(self.judge.as_ref(), case, &texts, self.config.min_k()).await,
            )
        }
    }
}

/// Metrics of a case that returned nothing: no recall, but nothing misleading either.
fn record_empty(scores: &mut Scorecard, k_values: &[usize], answerable: bool) {
    if answerable {
        scores.record_answerable(&AnswerableOutcome::zeros(k_values));
    } else {
        scores.record_unanswerable(1.0);
    }
}
