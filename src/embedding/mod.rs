//! Model wrappers.
//!
//! - [`encoder`] embeds queries for semantic retrieval.
//! - [`reranker`] provides the cross-encoder used by [`crate::scoring`].

/// BERT encoder and classifier wrappers.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Query encoder.
pub mod encoder;
mod error;
/// Cross-encoder reranker.
pub mod reranker;
/// Tokenizer/model loading helpers.
pub mod utils;

pub use encoder::{EncoderConfig, EncoderService, QueryEncoder, TextEncoder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use reranker::MockPairScorer;
pub use reranker::{CrossEncoder, PairScorer, RerankerConfig, RerankerError, RerankerService};
