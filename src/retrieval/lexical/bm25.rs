use std::collections::HashMap;

use crate::text::tokenize;

/// Okapi BM25 term-frequency saturation.
pub const BM25_K1: f32 = 1.5;

/// Okapi BM25 length normalization.
pub const BM25_B: f32 = 0.75;

/// In-memory Okapi BM25 index over a fixed document list.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    k1: f32,
    b: f32,
    doc_terms: Vec<HashMap<String, u32>>,
    doc_lengths: Vec<usize>,
    doc_freq: HashMap<String, usize>,
    avg_doc_len: f32,
}

impl Bm25Index {
    pub fn build<S: AsRef<str>>(documents: &[S]) -> Self {
        Self::with_params(documents, BM25_K1, BM25_B)
    }

    pub fn with_params<S: AsRef<str>>(documents: &[S], k1: f32, b: f32) -> Self {
        let mut doc_terms = Vec::with_capacity(documents.len());
        let mut doc_lengths = Vec::with_capacity(documents.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc.as_ref());
            doc_lengths.push(tokens.len());

            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            doc_terms.push(tf);
        }

        let total: usize = doc_lengths.iter().sum();
        let avg_doc_len = if doc_lengths.is_empty() {
            0.0
        } else {
            total as f32 / doc_lengths.len() as f32
        };

        Self {
            k1,
            b,
            doc_terms,
            doc_lengths,
            doc_freq,
            avg_doc_len,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_terms.is_empty()
    }

    /// Non-negative IDF: `ln(1 + (N - n + 0.5) / (n + 0.5))`.
    pub fn idf(&self, term: &str) -> f32 {
        let n = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
        let total = self.doc_terms.len() as f32;
        (1.0 + (total - n + 0.5) / (n + 0.5)).ln()
    }

    /// BM25 score of every document, in corpus order.
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let query_terms = tokenize(query);
        let mut scores = vec![0.0f32; self.doc_terms.len()];

        if self.avg_doc_len <= 0.0 {
            return scores;
        }

        for term in &query_terms {
            if !self.doc_freq.contains_key(term) {
                continue;
            }
            let idf = self.idf(term);

            for (i, tf_map) in self.doc_terms.iter().enumerate() {
                let Some(&tf) = tf_map.get(term) else {
                    continue;
                };
                let tf = tf as f32;
                let norm = 1.0 - self.b + self.b * self.doc_lengths[i] as f32 / self.avg_doc_len;
                scores[i] += idf * tf * (self.k1 + 1.0) / (tf + self.k1 * norm);
            }
        }

        scores
    }

    /// Top `k` `(doc index, score)` pairs; zero-score documents are omitted, ties keep corpus order.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .scores(query)
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > 0.0)
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);
        ranked
    }
}
