//! Ranking metrics over binary relevance verdicts.
//!
//! Every function takes verdicts in rank order (`verdicts[0]` is the top result).

/// Index of the first relevant result.
pub fn first_relevant(verdicts: &[bool]) -> Option<usize> {
    verdicts.iter().position(|&v| v)
}

/// Fraction of reference contexts found within the top `k`.
///
/// `hits[i]` is the rank at which reference `i` was first matched, if at all.
pub fn recall_at(hits: &[Option<usize>], k: usize) -> f64 {
    if hits.is_empty() {
        return 0.0;
    }
    let found = hits.iter().flatten().filter(|&&rank| rank < k).count();
    found as f64 / hits.len() as f64
}

/// Relevant fraction of the retrieved set. Empty set is `0.0`.
pub fn precision(verdicts: &[bool]) -> f64 {
    if verdicts.is_empty() {
        return 0.0;
    }
    verdicts.iter().filter(|&&v| v).count() as f64 / verdicts.len() as f64
}

/// Reciprocal rank of the first relevant result.
pub fn reciprocal_rank(verdicts: &[bool]) -> f64 {
    first_relevant(verdicts).map_or(0.0, |i| 1.0 / (i + 1) as f64)
}

/// NDCG with binary gains and `log2(rank + 1)` discount, normalized by the ideal ordering of the
/// same verdicts.
pub fn ndcg(verdicts: &[bool]) -> f64 {
    let idcg = dcg(&ideal(verdicts));
    if idcg <= 0.0 {
        return 0.0;
    }
    dcg(verdicts) / idcg
}

fn ideal(verdicts: &[bool]) -> Vec<bool> {
    let mut sorted = verdicts.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));
    sorted
}

fn dcg(verdicts: &[bool]) -> f64 {
    verdicts
        .iter()
        .enumerate()
        .filter(|(_, v)| **v)
        .map(|(i, _)| 1.0 / ((i + 2) as f64).log2())
        .sum()
}

/// `1.0` when none of the inspected results looks like support for an unanswerable question.
pub fn noise_robustness(verdicts: &[bool]) -> f64 {
    if verdicts.iter().any(|&v| v) { 0.0 } else { 1.0 }
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
