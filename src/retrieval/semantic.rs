use std::sync::Arc;

use tracing::debug;

use super::error::RetrievalError;
use crate::corpus::{CorpusStore, Passage};
use crate::embedding::QueryEncoder;

/// Nearest-neighbor search over passage embeddings.
#[derive(Clone)]
pub struct SemanticRetriever {
    encoder: Arc<dyn QueryEncoder>,
    store: Arc<dyn CorpusStore>,
}

impl SemanticRetriever {
    pub fn new(encoder: Arc<dyn QueryEncoder>, store: Arc<dyn CorpusStore>) -> Self {
        Self { encoder, store }
    }

    /// Returns at most `k` passages, most similar first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.encoder.encode(query)?;
        let mut hits = self.store.nearest(&vector, k).await?;
        hits.truncate(k);

        debug!(
            collection = self.store.collection(),
            hits = hits.len(),
            top_similarity = hits.first().map(|(_, s)| *s),
            "Semantic search complete"
        );

        Ok(hits.into_iter().map(|(passage, _)| passage).collect())
    }
}
