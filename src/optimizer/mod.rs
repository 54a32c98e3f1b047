//! Abstention threshold calibration.
//!
//! [`ThresholdOptimizer`] reranks every test case once, then replays the
//! [`AbstentionGate`](crate::scoring::AbstentionGate) at each candidate threshold and picks the
//! one maximizing `alpha * Recall@3 + (1 - alpha) * NoiseRobustness`.

pub mod config;
pub mod report;
pub mod sweep;
pub mod types;


pub use config::OptimizerConfig;
pub use report::{SweepReport, ThresholdCurves};
pub use sweep::ThresholdOptimizer;
pub use types::{ThresholdResult, Trend, combined_score, select_best};
