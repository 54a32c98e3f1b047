//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `TRIPGUARD_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_JUDGE_MODEL, DEFAULT_JUDGE_TIMEOUT_SECS, DEFAULT_RERANK_TOP_K,
    DEFAULT_RETRIEVAL_K, DEFAULT_SCORE_CUTOFF, DEFAULT_SWEEP_PACING_MS,
};
use crate::embedding::{EncoderConfig, RerankerConfig};
use crate::pipeline::RetrievalConfig;

/// Process configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TRIPGUARD_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Collection holding the policy passages.
    pub collection: String,

    /// Directory of the query encoder (BERT `config.json` + safetensors + tokenizer).
    pub encoder_path: Option<PathBuf>,

    /// Directory of the cross-encoder reranker.
    pub reranker_path: Option<PathBuf>,

    /// Candidates requested from each retriever. Default: `10`.
    pub retrieval_k: usize,

    /// Candidates kept after reranking. Default: `3`.
    pub rerank_top_k: usize,

    /// Per-document rerank cutoff. Default: [`DEFAULT_SCORE_CUTOFF`].
    pub score_cutoff: f32,

    /// Model name passed to the judge chat client.
    pub judge_model: String,

    /// Per-call judge timeout.
    pub judge_timeout: Duration,

    /// Delay between threshold sweeps.
    pub sweep_pacing: Duration,

    /// Where evaluation and sweep reports are written. Default: `./reports`.
    pub report_dir: PathBuf,
}

/// Default Qdrant URL used when `TRIPGUARD_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            encoder_path: None,
            reranker_path: None,
            retrieval_k: DEFAULT_RETRIEVAL_K,
            rerank_top_k: DEFAULT_RERANK_TOP_K,
            score_cutoff: DEFAULT_SCORE_CUTOFF,
            judge_model: DEFAULT_JUDGE_MODEL.to_string(),
            judge_timeout: Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS),
            sweep_pacing: Duration::from_millis(DEFAULT_SWEEP_PACING_MS),
            report_dir: PathBuf::from("./reports"),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "TRIPGUARD_PORT";
    const ENV_BIND_ADDR: &'static str = "TRIPGUARD_BIND_ADDR";
    const ENV_QDRANT_URL: &'static str = "TRIPGUARD_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "TRIPGUARD_COLLECTION";
    const ENV_ENCODER_PATH: &'static str = "TRIPGUARD_ENCODER_PATH";
    const ENV_RERANKER_PATH: &'static str = "TRIPGUARD_RERANKER_PATH";
    const ENV_RETRIEVAL_K: &'static str = "TRIPGUARD_RETRIEVAL_K";
    const ENV_RERANK_TOP_K: &'static str = "TRIPGUARD_RERANK_TOP_K";
    const ENV_SCORE_CUTOFF: &'static str = "TRIPGUARD_SCORE_CUTOFF";
    const ENV_JUDGE_MODEL: &'static str = "TRIPGUARD_JUDGE_MODEL";
    const ENV_JUDGE_TIMEOUT_SECS: &'static str = "TRIPGUARD_JUDGE_TIMEOUT_SECS";
    const ENV_SWEEP_PACING_MS: &'static str = "TRIPGUARD_SWEEP_PACING_MS";
    const ENV_REPORT_DIR: &'static str = "TRIPGUARD_REPORT_DIR";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let qdrant_url = Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url);
        let collection = Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection);
        let encoder_path = Self::parse_optional_path_from_env(Self::ENV_ENCODER_PATH);
        let reranker_path = Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH);
        let retrieval_k = Self::parse_usize_from_env(Self::ENV_RETRIEVAL_K, defaults.retrieval_k);
        let rerank_top_k =
            Self::parse_usize_from_env(Self::ENV_RERANK_TOP_K, defaults.rerank_top_k);
        let score_cutoff = Self::parse_cutoff_from_env(defaults.score_cutoff)?;
        let judge_model = Self::parse_string_from_env(Self::ENV_JUDGE_MODEL, defaults.judge_model);
        let judge_timeout = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_JUDGE_TIMEOUT_SECS,
            defaults.judge_timeout.as_secs(),
        ));
        let sweep_pacing = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_SWEEP_PACING_MS,
            defaults.sweep_pacing.as_millis() as u64,
        ));
        let report_dir = Self::parse_path_from_env(Self::ENV_REPORT_DIR, defaults.report_dir);

        Ok(Self {
            port,
            bind_addr,
            qdrant_url,
            collection,
            encoder_path,
            reranker_path,
            retrieval_k,
            rerank_top_k,
            score_cutoff,
            judge_model,
            judge_timeout,
            sweep_pacing,
            report_dir,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_dir.exists() && !self.report_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.report_dir.clone(),
            });
        }

        for path in [&self.encoder_path, &self.reranker_path].into_iter().flatten() {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if self.collection.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_COLLECTION,
                reason: "collection name cannot be empty".to_string(),
            });
        }

        if self.retrieval_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RETRIEVAL_K,
                reason: "must be at least 1".to_string(),
            });
        }

        if self.rerank_top_k == 0 || self.rerank_top_k > self.retrieval_k * 2 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RERANK_TOP_K,
                reason: format!(
                    "must be between 1 and {} (twice the retrieval depth)",
                    self.retrieval_k * 2
                ),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Encoder settings (stub mode when no path is configured).
    pub fn encoder_config(&self) -> EncoderConfig {
        match &self.encoder_path {
            Some(path) => EncoderConfig::new(path.clone()),
            None => EncoderConfig::stub(),
        }
    }

    /// Reranker model settings (stub mode when no path is configured).
    pub fn reranker_config(&self) -> RerankerConfig {
        match &self.reranker_path {
            Some(path) => RerankerConfig::new(path.clone()),
            None => RerankerConfig::stub(),
        }
    }

    /// Retrieval depths and cutoff used by `lookup` and the evaluation modes.
    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            retrieval_k: self.retrieval_k,
            rerank_top_k: self.rerank_top_k,
            score_cutoff: self.score_cutoff,
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_cutoff_from_env(default: f32) -> Result<f32, ConfigError> {
        match env::var(Self::ENV_SCORE_CUTOFF) {
            Ok(value) => {
                let cutoff: f32 =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::CutoffParseError {
                            value: value.clone(),
                            source: e,
                        })?;

                if !cutoff.is_finite() {
                    return Err(ConfigError::InvalidValue {
                        name: Self::ENV_SCORE_CUTOFF,
                        reason: format!("cutoff must be finite, got {value}"),
                    });
                }

                Ok(cutoff)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
