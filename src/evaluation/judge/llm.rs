use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest};
use tracing::debug;

use super::{Framing, JudgeError, JudgeRequest, RelevanceJudge};

const SYSTEM_PROMPT: &str = "You are a strict evaluator of retrieval quality for a corporate \
travel-policy assistant. Answer with a single word: yes or no.";

/// Chat-model judge with a per-call timeout.
#[derive(Clone)]
pub struct LlmJudge {
    client: Client,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for LlmJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmJudge")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmJudge {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(Client::default(), model, timeout)
    }

    pub fn with_client(client: Client, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Builds the user prompt for a request.
pub fn build_prompt(request: &JudgeRequest<'_>) -> String {
    match request.framing {
        Framing::Answerable => {
            let mut prompt = format!(
                "Decide whether the retrieved passage contains enough information to support the \
                 reference answer to the question.\n\nQuestion: {}\n\nReference answer: {}\n",
                request.question, request.reference_answer
            );
            if let Some(context) = request.reference_context {
                prompt.push_str(&format!("\nReference evidence: {}\n", context));
            }
            prompt.push_str(&format!(
                "\nRetrieved passage: {}\n\nReply \"yes\" if the passage supports the reference \
                 answer, otherwise \"no\".",
                request.candidate
            ));
            prompt
        }
        Framing::Unanswerable => format!(
            "Decide whether the retrieved passage contains information that actually answers the \
             question.\n\nQuestion: {}\n\nRetrieved passage: {}\n\nReply \"yes\" if the passage \
             answers the question, or \"no\" if it cannot answer it or is unrelated.",
            request.question, request.candidate
        ),
    }
}

/// Reads a yes/no verdict; anything without an affirmative is "no".
pub fn parse_verdict(answer: &str) -> bool {
    let answer = answer.trim();
    answer.to_lowercase().contains("yes") || answer.contains('是')
}

#[async_trait]
impl RelevanceJudge for LlmJudge {
    async fn judge(&self, request: &JudgeRequest<'_>) -> Result<bool, JudgeError> {
        let chat = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(request)),
        ]);

        let response = tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model, chat, None),
        )
        .await
        .map_err(|_| JudgeError::Timeout {
            seconds: self.timeout.as_secs(),
        })?
        .map_err(|e| JudgeError::Provider {
            reason: e.to_string(),
        })?;

        let answer = response.first_text().ok_or(JudgeError::EmptyResponse)?;
        let relevant = parse_verdict(answer);

        debug!(
            model = %self.model,
            framing = ?request.framing,
            answer = %answer.trim(),
            relevant,
            "Judge verdict"
        );

        Ok(relevant)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
