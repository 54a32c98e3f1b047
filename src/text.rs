//! Term tokenization shared by the BM25 index and the stub models.
//!
//! Lowercases, splits on anything that is not alphanumeric, and emits each CJK ideograph as its
//! own token (policy corpora are frequently Chinese and carry no word boundaries).

use std::collections::HashSet;
use std::sync::LazyLock;

/// English function words ignored by the stub scorers. BM25 keeps them; IDF handles weighting.
pub static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
        "can", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "about",
        "what", "which", "who", "how", "when", "where", "why", "and", "but", "if", "or", "not",
        "no", "this", "that", "these", "those", "it", "its", "i", "my", "me", "we", "our", "you",
        "your",
    ]
    .into_iter()
    .collect()
});

/// Returns `true` for characters tokenized one at a time.
#[inline]
pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x3040..=0x30FF
        | 0xAC00..=0xD7AF)
}

/// Splits `text` into lowercase terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if is_cjk(c) {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(c.to_string());
        } else if c.is_alphanumeric() {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Distinct terms of `text` with stop words removed.
pub fn content_terms(text: &str) -> HashSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
        .collect()
}
