//! Offline evaluation over a labeled question set.
//!
//! [`EvaluationHarness`] replays retrieval in each [`Mode`], asks a [`RelevanceJudge`] which
//! results are relevant, and aggregates ranking metrics (answerable cases) and noise robustness
//! (unanswerable cases) into an [`EvaluationReport`].

pub mod dataset;
pub mod diagnose;
pub mod error;
pub mod harness;
pub mod judge;
pub mod metrics;
pub mod report;
pub mod types;

#[cfg(test)]
mod tests;

pub use dataset::{TestCase, load_dataset, parse_dataset};
pub use diagnose::{Diagnosis, HardNegative, HardNegativeReport, diagnose_hard_negatives};
pub use error::{DatasetError, EvaluationError};
pub use harness::{EvaluationHarness, judge_answerable, judge_unanswerable};
#[cfg(any(test, feature = "mock"))]
pub use judge::MockJudge;
pub use judge::{
    Framing, HeuristicJudge, JudgeError, JudgeRequest, LlmJudge, RelevanceJudge,
    judge_or_fallback,
};
pub use report::{Contribution, EvaluationReport};
pub use types::{AnswerableOutcome, EvaluationConfig, Mode, ModeResult, Scorecard};
