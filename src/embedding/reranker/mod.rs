pub mod config;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use config::{MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockPairScorer;

use std::sync::Arc;

use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::BertClassifier;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::utils::{load_tokenizer_with_truncation, missing_model_file};
use crate::lazy::LazyService;
use crate::text::content_terms;

/// Scores how well `candidate` answers `query`; higher is more relevant.
pub trait PairScorer: Send + Sync {
    fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError>;
}

/// BERT cross-encoder over (query, passage) pairs.
pub struct CrossEncoder {
    device: candle_core::Device,
    config: RerankerConfig,
    model: Option<BertClassifier>,
    tokenizer: Option<Tokenizer>,
}

impl std::fmt::Debug for CrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoder")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl CrossEncoder {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let device = select_device()?;
        debug!(device = device_label(&device), "Selected compute device for reranker");

        let Some(model_path) = config.model_path.clone() else {
            info!("No reranker model path configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                model: None,
                tokenizer: None,
            });
        };

        if !model_path.exists() {
            return Err(RerankerError::ModelNotFound { path: model_path });
        }

        if let Some(missing) = missing_model_file(&model_path) {
            return Err(RerankerError::ModelLoadFailed {
                reason: format!("Missing {} in {}", missing, model_path.display()),
            });
        }

        info!(
            model_path = %model_path.display(),
            apply_sigmoid = config.apply_sigmoid,
            "Loading reranker model"
        );

        let model = BertClassifier::load(&model_path, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer_with_truncation(&model_path, MAX_SEQ_LEN).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!("Reranker model loaded successfully");

        Ok(Self {
            device,
            config,
            model: Some(model),
            tokenizer: Some(tokenizer),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    pub fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        let (Some(model), Some(tokenizer)) = (&self.model, &self.tokenizer) else {
            let score = Self::placeholder_score(query, candidate);
            debug!(score, "Computed score (stub)");
            return Ok(score);
        };

        let tokens = tokenizer.encode((query, candidate), true).map_err(|e| {
            RerankerError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let token_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = model.forward(&token_ids, &type_ids, Some(&attention_mask))?;
        let logit = logits
            .flatten_all()?
            .to_vec1::<f32>()?
            .first()
            .copied()
            .ok_or_else(|| RerankerError::InferenceFailed {
                reason: "classifier produced no logits".to_string(),
            })?;

        let score = if self.config.apply_sigmoid {
            sigmoid(logit)
        } else {
            logit
        };

        debug!(
            query_len = query.len(),
            candidate_len = candidate.len(),
            score,
            "Scored query-candidate pair"
        );

        Ok(score)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    pub fn device(&self) -> &candle_core::Device {
        &self.device
    }

    /// Term-overlap score in `[0, 1]`: blended query recall and Jaccard, squashed by a sigmoid.
    fn placeholder_score(query: &str, candidate: &str) -> f32 {
        let query_terms = content_terms(query);
        let candidate_terms = content_terms(candidate);

        if query_terms.is_empty() {
            let len_ratio = (query.len().min(candidate.len()) as f32)
                / (query.len().max(candidate.len()).max(1) as f32);
            return len_ratio * 0.3;
        }

        let matches = query_terms.intersection(&candidate_terms).count();
        let recall = matches as f32 / query_terms.len() as f32;

        let union = query_terms.union(&candidate_terms).count();
        let jaccard = if union > 0 {
            matches as f32 / union as f32
        } else {
            0.0
        };

        let base_score = 0.6 * recall + 0.4 * jaccard;
        sigmoid(8.0 * (base_score - 0.5)).clamp(0.0, 1.0)
    }
}

impl PairScorer for CrossEncoder {
    fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        CrossEncoder::score(self, query, candidate)
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Process-wide cross-encoder, loaded on first use.
#[derive(Debug)]
pub struct RerankerService {
    config: RerankerConfig,
    inner: LazyService<CrossEncoder>,
}

impl RerankerService {
    pub fn new(config: RerankerConfig) -> Self {
        Self {
            config,
            inner: LazyService::new("cross_encoder"),
        }
    }

    /// Returns the shared cross-encoder, loading it if needed.
    pub fn get(&self) -> Result<Arc<CrossEncoder>, RerankerError> {
        self.inner.get_or_try_init(|| {
            CrossEncoder::load(self.config.clone()).inspect_err(|e| {
                warn!(error = %e, "Cross-encoder failed to load");
            })
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.is_initialized()
    }

    pub fn is_stub(&self) -> bool {
        self.config.model_path.is_none()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }
}

impl PairScorer for RerankerService {
    fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        self.get()?.score(query, candidate)
    }
}
