//! Cross-encoder reranking and confidence gating.
//!
//! [`CandidateReranker`] turns fused [`Candidate`](crate::retrieval::Candidate)s into sorted
//! [`ScoredCandidate`]s and applies the per-document cutoff. [`AbstentionGate`] is the separate
//! whole-query gate used by evaluation and the threshold sweep.

pub mod error;
pub mod gate;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use gate::{AbstentionGate, DocumentCutoff};
pub use scorer::CandidateReranker;
pub use types::{GateOutcome, ScoredCandidate};
