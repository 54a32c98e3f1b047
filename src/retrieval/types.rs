use serde::{Deserialize, Serialize};

use crate::corpus::Passage;

/// Which first-stage retriever produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Semantic,
    Lexical,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Semantic => "semantic",
            Origin::Lexical => "lexical",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fused, not yet scored, retrieval candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub passage: Passage,
    pub origin: Origin,
}

impl Candidate {
    pub fn new(passage: Passage, origin: Origin) -> Self {
        Self { passage, origin }
    }

    pub fn text(&self) -> &str {
        &self.passage.text
    }
}
