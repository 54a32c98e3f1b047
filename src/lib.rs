//! TripGuard policy retrieval (used by the `tripguard` binary and integration tests).
//!
//! Answers travel-policy questions from a fixed corpus and abstains when nothing supports the
//! question.
//!
//! # Pipeline
//!
//! query → {[`SemanticRetriever`], [`LexicalRetriever`]} → [`merge`] → [`CandidateReranker`] →
//! gate → ranked passages. [`HybridRetriever::lookup`] renders the result for downstream agents.
//!
//! # Public API Surface
//!
//! ## Retrieval
//! - [`HybridRetriever`], [`RetrievalConfig`], [`PipelineServices`] - end-to-end pipeline
//! - [`Passage`], [`Candidate`], [`ScoredCandidate`] - data flowing through it
//! - [`AbstentionGate`], [`DocumentCutoff`] - the two confidence gates
//!
//! ## Models & Store
//! - [`EncoderService`], [`RerankerService`] - lazily loaded BERT encoder / cross-encoder
//! - [`QdrantCorpusStore`] - policy corpus in Qdrant
//!
//! ## Evaluation
//! - [`EvaluationHarness`], [`EvaluationReport`] - four-mode offline evaluation
//! - [`ThresholdOptimizer`], [`SweepReport`] - abstention threshold calibration
//! - [`RelevanceJudge`], [`LlmJudge`], [`HeuristicJudge`] - relevance oracles
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod evaluation;
pub mod gateway;
pub mod hashing;
pub mod lazy;
pub mod optimizer;
pub mod pipeline;
pub mod retrieval;
pub mod scoring;
pub mod text;

pub use config::{Config, ConfigError};
#[cfg(any(test, feature = "mock"))]
pub use corpus::MockCorpusStore;
pub use corpus::{CorpusError, CorpusStore, Passage, QdrantCorpusStore};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockPairScorer;
pub use embedding::{
    CrossEncoder, EmbeddingError, EncoderConfig, EncoderService, PairScorer, QueryEncoder,
    RerankerConfig, RerankerError, RerankerService, TextEncoder,
};
#[cfg(any(test, feature = "mock"))]
pub use evaluation::MockJudge;
pub use evaluation::{
    DatasetError, Diagnosis, EvaluationConfig, EvaluationError, EvaluationHarness,
    EvaluationReport, HardNegativeReport, HeuristicJudge, LlmJudge, Mode, ModeResult,
    RelevanceJudge, TestCase, diagnose_hard_negatives, load_dataset,
};
pub use hashing::{hash_to_u64, passage_key, query_fingerprint};
pub use lazy::LazyService;
pub use optimizer::{
    OptimizerConfig, SweepReport, ThresholdCurves, ThresholdOptimizer, ThresholdResult,
};
pub use pipeline::{
    HybridRetriever, PipelineServices, Readiness, RetrievalConfig, format_error, format_passages,
};
pub use retrieval::{
    Bm25Index, Candidate, LexicalRetriever, Origin, RetrievalError, SemanticRetriever, merge,
};
pub use scoring::{
    AbstentionGate, CandidateReranker, DocumentCutoff, GateOutcome, ScoredCandidate, ScoringError,
};
