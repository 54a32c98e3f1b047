//! Query encoder for semantic retrieval.
//!
//! Runs a BERT bi-encoder (`[CLS]` pooling, L2-normalized) when a model directory is configured,
//! otherwise a deterministic hashed bag-of-terms stub so the pipeline works without model files.

/// Encoder configuration.
pub mod config;


pub use config::{ENCODER_MAX_SEQ_LEN, EncoderConfig, STUB_EMBEDDING_DIM};

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::BertEncoder;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::{l2_normalize, load_tokenizer_with_truncation, missing_model_file};
use crate::hashing::hash_to_u64;
use crate::lazy::LazyService;
use crate::text::tokenize;

/// Turns query text into a vector comparable with the indexed passage vectors.
pub trait QueryEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

enum EncoderBackend {
    Model {
        model: BertEncoder,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Query encoder (supports stub mode).
pub struct TextEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for TextEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("config", &self.config)
            .finish()
    }
}

impl TextEncoder {
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_path) = config.model_path.clone() else {
            warn!("No encoder model path configured, operating in stub mode");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
            });
        };

        if let Some(missing) = missing_model_file(&model_path) {
            return Err(EmbeddingError::ModelLoadFailed {
                reason: format!("Missing {} in {}", missing, model_path.display()),
            });
        }

        let device = select_device()?;
        debug!(device = device_label(&device), "Selected compute device for query encoder");

        info!(model_path = %model_path.display(), "Loading query encoder");

        let model = BertEncoder::load(&model_path, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer_with_truncation(&model_path, config.max_seq_len)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;

        info!(
            hidden_size = model.hidden_size(),
            max_seq_len = config.max_seq_len,
            "Query encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EncoderConfig::stub())
    }

    /// Encodes `text` into a unit-length vector.
    pub fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => Self::encode_with_model(text, model, tokenizer, device),
            EncoderBackend::Stub => Ok(self.encode_stub(text)),
        }
    }

    fn encode_with_model(
        text: &str,
        model: &BertEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Encoding query"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let cls = model
            .forward_cls(&input_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Encoder forward pass failed: {}", e),
            })?;

        let mut embedding = cls.squeeze(0)?.to_vec1::<f32>()?;
        l2_normalize(&mut embedding);
        Ok(embedding)
    }

    /// Hashed bag-of-terms: each term bumps one bucket, then the vector is normalized.
    fn encode_stub(&self, text: &str) -> Vec<f32> {
        let dim = self.config.stub_dim;
        let mut embedding = vec![0.0f32; dim];

        for term in tokenize(text) {
            let bucket = (hash_to_u64(term.as_bytes()) % dim as u64) as usize;
            embedding[bucket] += 1.0;
        }

        l2_normalize(&mut embedding);
        embedding
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl QueryEncoder for TextEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        TextEncoder::encode(self, text)
    }
}

/// Process-wide encoder, loaded on first use.
#[derive(Debug)]
pub struct EncoderService {
    config: EncoderConfig,
    inner: LazyService<TextEncoder>,
}

impl EncoderService {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            inner: LazyService::new("query_encoder"),
        }
    }

    /// Returns the shared encoder, loading it if needed.
    pub fn get(&self) -> Result<Arc<TextEncoder>, EmbeddingError> {
        self.inner
            .get_or_try_init(|| TextEncoder::load(self.config.clone()))
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.is_initialized()
    }

    pub fn is_stub(&self) -> bool {
        self.config.is_stub()
    }
}

impl QueryEncoder for EncoderService {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.get()?.encode(text)
    }
}
