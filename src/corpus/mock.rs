use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{CorpusError, CorpusStore, Passage};

/// In-memory corpus with brute-force cosine search.
#[derive(Default)]
pub struct MockCorpusStore {
    collection: String,
    entries: RwLock<Vec<(Passage, Vec<f32>)>>,
    unavailable: AtomicBool,
}

impl MockCorpusStore {
    pub fn new() -> Self {
        Self {
            collection: "mock_policy".to_string(),
            ..Default::default()
        }
    }

    /// Appends a passage and its embedding.
    pub fn insert(&self, passage: Passage, vector: Vec<f32>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.push((passage, vector));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes every subsequent call fail as if the collection had never been created.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CorpusError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CorpusError::CollectionNotFound {
                collection: self.collection.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CorpusStore for MockCorpusStore {
    async fn list_all(&self) -> Result<Vec<Passage>, CorpusError> {
        self.check_available()?;

        let entries = self.entries.read().map_err(|_| CorpusError::ScrollFailed {
            collection: self.collection.clone(),
            message: "lock poisoned".to_string(),
        })?;

        Ok(entries.iter().map(|(p, _)| p.clone()).collect())
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(Passage, f32)>, CorpusError> {
        self.check_available()?;

        let entries = self.entries.read().map_err(|_| CorpusError::SearchFailed {
            collection: self.collection.clone(),
            message: "lock poisoned".to_string(),
        })?;

        if let Some((_, first)) = entries.first()
            && first.len() != query.len()
        {
            return Err(CorpusError::InvalidDimension {
                expected: first.len(),
                actual: query.len(),
            });
        }

        let mut results: Vec<(Passage, f32)> = entries
            .iter()
            .map(|(p, v)| (p.clone(), cosine_similarity(query, v)))
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
