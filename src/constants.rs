//! Cross-cutting, shared constants.
//!
//! Every tunable default lives here once. Sub-configs (`RerankerConfig`, `RetrievalConfig`,
//! `EvaluationConfig`, `OptimizerConfig`) derive their defaults from these values.
//!
//! # Cutoff Invariant
//!
//! [`DEFAULT_SCORE_CUTOFF`] is the single source of truth for the per-document rerank cutoff.
//! The lookup entry point, the reranker config and the fused+reranked evaluation mode all read
//! it through [`crate::config::Config::score_cutoff`].

/// Candidates requested from each retriever before fusion.
pub const DEFAULT_RETRIEVAL_K: usize = 10;

/// Candidates kept after cross-encoder reranking.
pub const DEFAULT_RERANK_TOP_K: usize = 3;

/// Minimum cross-encoder score for a single passage to survive reranking (inclusive).
pub const DEFAULT_SCORE_CUTOFF: f32 = 0.5;

/// `Recall@k` depths evaluated by default.
pub const DEFAULT_K_VALUES: [usize; 3] = [3, 5, 10];

/// Depth whose recall feeds the optimizer objective.
pub const OBJECTIVE_RECALL_K: usize = 3;

/// Recall weight in `alpha * Recall@3 + (1 - alpha) * NoiseRobustness`.
pub const DEFAULT_ALPHA: f32 = 0.6;

/// Cutoffs swept by default: `0.1, 0.2, ..., 0.9`.
pub const DEFAULT_SWEEP_THRESHOLDS: [f32; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

/// Delay between two threshold sweeps (judge provider throttling).
pub const DEFAULT_SWEEP_PACING_MS: u64 = 1_000;

/// Per-call timeout for the relevance judge.
pub const DEFAULT_JUDGE_TIMEOUT_SECS: u64 = 30;

/// Judge model used when `TRIPGUARD_JUDGE_MODEL` is not set.
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4o-mini";

/// Candidate texts longer than this (in chars) are treated as possibly relevant when the judge
/// is unavailable for an unanswerable case.
pub const FALLBACK_MIN_SUPPORT_CHARS: usize = 50;

/// Leading comma-separated clauses of a reference answer tried by the fallback judge.
pub const FALLBACK_ANSWER_CLAUSES: usize = 3;

/// Returned by `lookup` when nothing survives the gate.
pub const NO_POLICY_FOUND: &str = "no relevant policy found";

/// Prefix of the string returned by `lookup` on internal failure.
pub const RETRIEVAL_ERROR_PREFIX: &str = "retrieval system error";

/// Source label used when a passage carries no file name.
pub const UNKNOWN_SOURCE: &str = "unknown source";

/// Default Qdrant collection holding the policy corpus.
pub const DEFAULT_COLLECTION_NAME: &str = "trip_guard_collection";

/// Payload key holding the passage text.
pub const PAYLOAD_TEXT_KEY: &str = "page_content";

/// Payload key holding the originating file.
pub const PAYLOAD_SOURCE_KEY: &str = "source";

/// Payload key holding the zero-based page index.
pub const PAYLOAD_PAGE_KEY: &str = "page";
