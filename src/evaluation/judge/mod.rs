//! Relevance judging for evaluation.
//!
//! An LLM decides whether a retrieved passage supports a reference answer (answerable cases) or
//! could be mistaken for support (unanswerable cases). Failures and timeouts degrade to
//! [`HeuristicJudge`] rather than being scored as irrelevant.

pub mod heuristic;
pub mod llm;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use heuristic::HeuristicJudge;
pub use llm::LlmJudge;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockJudge;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// How the judge should read the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Does the candidate support the reference answer?
    Answerable,
    /// Could the candidate be mistaken for support of a question with no answer in the corpus?
    Unanswerable,
}

/// One (question, candidate) relevance question.
#[derive(Debug, Clone, Copy)]
pub struct JudgeRequest<'a> {
    pub question: &'a str,
    pub reference_answer: &'a str,
    /// Reference snippet being looked for, when judging recall.
    pub reference_context: Option<&'a str>,
    pub candidate: &'a str,
    pub framing: Framing,
}

impl<'a> JudgeRequest<'a> {
    pub fn answerable(question: &'a str, reference_answer: &'a str, candidate: &'a str) -> Self {
        Self {
            question,
            reference_answer,
            reference_context: None,
            candidate,
            framing: Framing::Answerable,
        }
    }

    pub fn unanswerable(question: &'a str, candidate: &'a str) -> Self {
        Self {
            question,
            reference_answer: "",
            reference_context: None,
            candidate,
            framing: Framing::Unanswerable,
        }
    }

    pub fn with_reference_context(mut self, context: &'a str) -> Self {
        self.reference_context = Some(context);
        self
    }
}

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("judge provider error: {reason}")]
    Provider { reason: String },

    #[error("judge returned no text")]
    EmptyResponse,
}

/// Relevance oracle.
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    /// Returns `true` if the candidate is relevant under the request's framing.
    async fn judge(&self, request: &JudgeRequest<'_>) -> Result<bool, JudgeError>;

    /// Name used in logs and reports.
    fn name(&self) -> &str;
}

/// Asks `judge`, falling back to the heuristic on any error.
pub async fn judge_or_fallback(judge: &dyn RelevanceJudge, request: &JudgeRequest<'_>) -> bool {
    match judge.judge(request).await {
        Ok(relevant) => relevant,
        Err(e) => {
            let relevant = HeuristicJudge::decide(request);
            warn!(
                judge = judge.name(),
                error = %e,
                framing = ?request.framing,
                fallback_verdict = relevant,
                "Judge failed, using heuristic fallback"
            );
            relevant
        }
    }
}

#[cfg(test)]
mod tests;
