use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::DatasetError;

/// One labeled evaluation question.
///
/// Serialized as `{"question", "ground_truth", "ground_truth_context": [..]}`. A case with no
/// reference contexts is *unanswerable*: the corpus holds nothing that answers it. The
/// `ground_truth_context` field is required; only an explicit empty list marks a case
/// unanswerable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub question: String,
    #[serde(rename = "ground_truth", default)]
    pub reference_answer: String,
    #[serde(rename = "ground_truth_context")]
    pub reference_contexts: Vec<String>,
}

impl TestCase {
    pub fn answerable(
        question: impl Into<String>,
        reference_answer: impl Into<String>,
        reference_contexts: Vec<String>,
    ) -> Self {
        Self {
            question: question.into(),
            reference_answer: reference_answer.into(),
            reference_contexts,
        }
    }

    pub fn unanswerable(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            reference_answer: String::new(),
            reference_contexts: Vec::new(),
        }
    }

    pub fn is_answerable(&self) -> bool {
        !self.reference_contexts.is_empty()
    }
}

/// Parses a dataset from JSON text.
pub fn parse_dataset(json: &str) -> Result<Vec<TestCase>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Loads a non-empty dataset from a JSON file.
pub fn load_dataset(path: &Path) -> Result<Vec<TestCase>, DatasetError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let cases = parse_dataset(&raw).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if cases.is_empty() {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
        });
    }

    let answerable = cases.iter().filter(|c| c.is_answerable()).count();
    info!(
        path = %path.display(),
        cases = cases.len(),
        answerable,
        unanswerable = cases.len() - answerable,
        "Loaded evaluation dataset"
    );

    Ok(cases)
}
