use async_trait::async_trait;

use super::{Framing, JudgeError, JudgeRequest, RelevanceJudge};
use crate::constants::{FALLBACK_ANSWER_CLAUSES, FALLBACK_MIN_SUPPORT_CHARS};

/// Offline judge, also the fallback when the LLM judge fails.
///
/// Answerable: the candidate contains the reference answer, or one of its first few
/// comma-separated clauses. Unanswerable: any candidate longer than a short threshold counts as
/// possibly relevant, which biases noise robustness downwards rather than overstating it.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicJudge;

impl HeuristicJudge {
    pub fn decide(request: &JudgeRequest<'_>) -> bool {
        match request.framing {
            Framing::Unanswerable => {
                request.candidate.trim().chars().count() > FALLBACK_MIN_SUPPORT_CHARS
            }
            Framing::Answerable => answer_supported(request.reference_answer, request.candidate),
        }
    }
}

fn answer_supported(reference_answer: &str, candidate: &str) -> bool {
    if reference_answer.is_empty() {
        return false;
    }
    if candidate.contains(reference_answer) {
        return true;
    }

    reference_answer
        .split(['，', ','])
        .take(FALLBACK_ANSWER_CLAUSES)
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .any(|clause| candidate.contains(clause))
}

#[async_trait]
impl RelevanceJudge for HeuristicJudge {
    async fn judge(&self, request: &JudgeRequest<'_>) -> Result<bool, JudgeError> {
        Ok(Self::decide(request))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
