use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Max tokens fed to the query encoder.
pub const ENCODER_MAX_SEQ_LEN: usize = 512;

/// Dimension of stub-mode embeddings.
pub const STUB_EMBEDDING_DIM: usize = 384;

/// Configuration for [`TextEncoder`](super::TextEncoder).
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Model directory; `None` runs the deterministic stub.
    pub model_path: Option<PathBuf>,
    /// Max tokens per query.
    pub max_seq_len: usize,
    /// Output dimension in stub mode.
    pub stub_dim: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            max_seq_len: ENCODER_MAX_SEQ_LEN,
            stub_dim: STUB_EMBEDDING_DIM,
        }
    }
}

impl EncoderConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn with_stub_dim(mut self, stub_dim: usize) -> Self {
        self.stub_dim = stub_dim;
        self
    }

    /// Returns `true` when no model directory is configured.
    pub fn is_stub(&self) -> bool {
        self.model_path.is_none()
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be at least 1".to_string(),
            });
        }

        if self.stub_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "stub_dim must be at least 1".to_string(),
            });
        }

        if let Some(ref path) = self.model_path {
            if path.as_os_str().is_empty() {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "model_path cannot be empty when provided".to_string(),
                });
            }
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path: path.clone() });
            }
        }

        Ok(())
    }
}
