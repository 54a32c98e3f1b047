//! Keyword retrieval: BM25 over the full corpus snapshot.

pub mod bm25;

pub use bm25::{BM25_B, BM25_K1, Bm25Index};

use std::sync::Arc;

use tracing::{debug, warn};

use super::error::RetrievalError;
use crate::corpus::{CorpusStore, Passage};

/// BM25 retriever; the index is rebuilt from the store on every call so it never goes stale.
#[derive(Clone)]
pub struct LexicalRetriever {
    store: Arc<dyn CorpusStore>,
}

impl LexicalRetriever {
    pub fn new(store: Arc<dyn CorpusStore>) -> Self {
        Self { store }
    }

    /// Returns at most `k` passages ranked by BM25; an empty corpus yields an empty list.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let corpus = self.store.list_all().await?;

        if corpus.is_empty() {
            warn!(
                collection = self.store.collection(),
                "Corpus is empty, lexical search skipped"
            );
            return Ok(Vec::new());
        }

        let index = Bm25Index::build(
            &corpus
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>(),
        );
        let ranked = index.top_k(query, k);

        debug!(
            corpus = index.len(),
            hits = ranked.len(),
            top_score = ranked.first().map(|(_, s)| *s),
            "Lexical search complete"
        );

        Ok(ranked.into_iter().map(|(i, _)| corpus[i].clone()).collect())
    }
}
