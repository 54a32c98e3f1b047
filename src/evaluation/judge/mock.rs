use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Framing, JudgeError, JudgeRequest, RelevanceJudge};

/// Scripted judge: a candidate is relevant when it contains one of the configured markers.
///
/// Requests carrying a reference context with a [`supports`](Self::supports) rule are decided by
/// that rule alone.
#[derive(Debug, Default)]
pub struct MockJudge {
    context_rules: Vec<(String, String)>,
    answerable_markers: Vec<String>,
    unanswerable_markers: Vec<String>,
    failing: AtomicBool,
    calls: AtomicUsize,
    log: Mutex<Vec<(Framing, String)>>,
}

impl MockJudge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates containing `marker` support answerable questions.
    pub fn relevant_when(mut self, marker: &str) -> Self {
        self.answerable_markers.push(marker.to_string());
        self
    }

    /// Candidates containing `marker` match the reference snippet `context`.
    pub fn supports(mut self, context: &str, marker: &str) -> Self {
        self.context_rules
            .push((context.to_string(), marker.to_string()));
        self
    }

    /// Candidates containing `marker` look like support for unanswerable questions.
    pub fn misleading_when(mut self, marker: &str) -> Self {
        self.unanswerable_markers.push(marker.to_string());
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every (framing, candidate) pair judged so far.
    pub fn judged(&self) -> Vec<(Framing, String)> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl RelevanceJudge for MockJudge {
    async fn judge(&self, request: &JudgeRequest<'_>) -> Result<bool, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .push((request.framing, request.candidate.to_string()));

        if self.failing.load(Ordering::SeqCst) {
            return Err(JudgeError::Provider {
                reason: "mock judge failure".to_string(),
            });
        }

        if let Some(context) = request.reference_context {
            let mut rules = self
                .context_rules
                .iter()
                .filter(|(c, _)| c.as_str() == context)
                .peekable();
            if rules.peek().is_some() {
                return Ok(rules.any(|(_, marker)| request.candidate.contains(marker.as_str())));
            }
        }

        let markers = match request.framing {
            Framing::Answerable => &self.answerable_markers,
            Framing::Unanswerable => &self.unanswerable_markers,
        };
        Ok(markers.iter().any(|m| request.candidate.contains(m.as_str())))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
