use std::path::PathBuf;

/// Max tokens for a (query, passage) pair.
pub const MAX_SEQ_LEN: usize = 512;

#[derive(Debug, Clone)]
pub struct RerankerConfig {
    /// Cross-encoder model directory; `None` runs the stub scorer.
    pub model_path: Option<PathBuf>,

    /// Map raw logits through a sigmoid so scores land in `[0, 1]`.
    pub apply_sigmoid: bool,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            apply_sigmoid: true,
        }
    }
}

impl RerankerConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_raw_logits(mut self) -> Self {
        self.apply_sigmoid = false;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }

        Ok(())
    }
}
