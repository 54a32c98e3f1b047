//! First-stage retrieval: semantic, lexical, and their fusion.

pub mod error;
pub mod fusion;
pub mod lexical;
pub mod semantic;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::RetrievalError;
pub use fusion::{dedup, merge};
pub use lexical::{Bm25Index, LexicalRetriever};
pub use semantic::SemanticRetriever;
pub use types::{Candidate, Origin};
