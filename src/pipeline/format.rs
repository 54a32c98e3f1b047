use crate::constants::{NO_POLICY_FOUND, RETRIEVAL_ERROR_PREFIX};
use crate::scoring::ScoredCandidate;

/// Renders one block per passage, 1-based ranks, separated by a blank line.
///
/// An empty result renders as the "no relevant policy found" sentinel.
pub fn format_passages(passages: &[ScoredCandidate]) -> String {
    if passages.is_empty() {
        return NO_POLICY_FOUND.to_string();
    }

    passages
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "[Reference {}]\nSource: {}\nContent: {}",
                i + 1,
                c.passage.label(),
                c.passage.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Error sentinel returned by `lookup` instead of propagating a failure.
pub fn format_error(message: impl std::fmt::Display) -> String {
    format!("{RETRIEVAL_ERROR_PREFIX}: {message}")
}

/// Returns `true` if `output` is the error sentinel.
pub fn is_error_sentinel(output: &str) -> bool {
    output.starts_with(RETRIEVAL_ERROR_PREFIX)
}
