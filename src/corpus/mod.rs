//! Policy corpus access (Qdrant, plus an in-memory mock for tests).

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;

#[cfg(test)]
mod tests;

pub use client::{CorpusStore, QdrantCorpusStore, SCROLL_PAGE_SIZE};
pub use error::CorpusError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCorpusStore, cosine_similarity};
pub use model::Passage;
