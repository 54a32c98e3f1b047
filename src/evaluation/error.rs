use std::path::PathBuf;

use thiserror::Error;

/// Errors loading a labeled test set.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset {path} contains no test cases")]
    Empty { path: PathBuf },
}

/// Errors from an evaluation or sweep run (per-query retrieval failures are not errors).
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("invalid evaluation config: {reason}")]
    InvalidConfig { reason: String },

    #[error("no test cases to evaluate")]
    EmptyDataset,

    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
