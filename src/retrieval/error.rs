use thiserror::Error;

use crate::corpus::CorpusError;
use crate::embedding::{EmbeddingError, RerankerError};

/// Errors from the first-stage retrievers and service construction.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("corpus unavailable: {0}")]
    Corpus(#[from] CorpusError),

    #[error("query encoding failed: {0}")]
    Encoding(#[from] EmbeddingError),

    #[error("reranker unavailable: {0}")]
    Reranker(#[from] RerankerError),
}
