use std::collections::HashSet;

use tracing::debug;

use super::types::{Candidate, Origin};
use crate::corpus::Passage;

/// Merges semantic and lexical results: semantic first, then lexical, each in its own order,
/// keeping only the first occurrence of every passage (by trimmed text).
pub fn merge(semantic: Vec<Passage>, lexical: Vec<Passage>) -> Vec<Candidate> {
    let semantic_len = semantic.len();
    let lexical_len = lexical.len();

    let tagged = semantic
        .into_iter()
        .map(|p| Candidate::new(p, Origin::Semantic))
        .chain(lexical.into_iter().map(|p| Candidate::new(p, Origin::Lexical)));

    let merged = dedup(tagged);

    debug!(
        semantic = semantic_len,
        lexical = lexical_len,
        merged = merged.len(),
        "Fused candidate lists"
    );

    merged
}

/// Drops every candidate whose trimmed text was already seen, preserving order.
pub fn dedup(candidates: impl IntoIterator<Item = Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.passage.dedup_key()))
        .collect()
}
