use super::*;
use std::path::PathBuf;
use crate::constants::DEFAULT_SCORE_CUTOFF;

#[test]
fn test_config_default() {
    let config = RerankerConfig::default();

    assert!(config.model_path.is_none());
    assert!(config.apply_sigmoid);
}

#[test]
fn test_config_new() {
    let config = RerankerConfig::new("/models/bge-reranker-base");

    assert_eq!(
        config.model_path,
        Some(PathBuf::from("/models/bge-reranker-base"))
    );
    assert!(config.apply_sigmoid);
}

#[test]
fn test_config_with_raw_logits() {
    let config = RerankerConfig::default().with_raw_logits();

    assert!(!config.apply_sigmoid);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validate() {
    assert!(RerankerConfig::default().validate().is_ok());

    let empty_path = RerankerConfig {
        model_path: Some(PathBuf::new()),
        ..Default::default()
    };
    assert!(empty_path.validate().is_err());
}

#[test]
fn test_stub_creation() {
    let encoder = CrossEncoder::stub().unwrap();
    assert!(!encoder.is_model_loaded());
}

#[test]
fn test_load_with_missing_model() {
    let result = CrossEncoder::load(RerankerConfig::new("/nonexistent/path/reranker"));
    assert!(matches!(
        result.unwrap_err(),
        RerankerError::ModelNotFound { .. }
    ));
}

#[test]
fn test_load_with_incomplete_model_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "{}").unwrap();

    let result = CrossEncoder::load(RerankerConfig::new(dir.path()));
    match result.unwrap_err() {
        RerankerError::ModelLoadFailed { reason } => {
            assert!(reason.contains("model.safetensors"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_config_rejected_on_load() {
    let config = RerankerConfig {
        model_path: Some(PathBuf::new()),
        ..Default::default()
    };
    assert!(matches!(
        CrossEncoder::load(config),
        Err(RerankerError::InvalidConfig { .. })
    ));
}

#[test]
fn test_stub_score_range_and_determinism() {
    let encoder = CrossEncoder::stub().unwrap();

    let a = encoder
        .score("hotel cap", "The hotel cap is 500 per night")
        .unwrap();
    let b = encoder
        .score("hotel cap", "The hotel cap is 500 per night")
        .unwrap();

    assert_eq!(a, b);
    assert!((0.0..=1.0).contains(&a));
}

#[test]
fn test_stub_related_scores_higher() {
    let encoder = CrossEncoder::stub().unwrap();

    let related = encoder
        .score(
            "What is the hotel cap per night?",
            "Hotel cap per night is 500",
        )
        .unwrap();
    let unrelated = encoder
        .score(
            "What is the hotel cap per night?",
            "Taxi receipts must be itemised",
        )
        .unwrap();

    assert!(related > unrelated);
    assert!(related > DEFAULT_SCORE_CUTOFF);
    assert!(unrelated < DEFAULT_SCORE_CUTOFF);
}

#[test]
fn test_stub_handles_cjk() {
    let encoder = CrossEncoder::stub().unwrap();

    let related = encoder.score("住宿标准", "一线城市住宿标准为每晚500元").unwrap();
    let unrelated = encoder.score("住宿标准", "出租车发票需要注明行程").unwrap();

    assert!(related > unrelated);
}

#[test]
fn test_stub_stop_word_only_query() {
    let encoder = CrossEncoder::stub().unwrap();
    let score = encoder.score("what is the", "anything at all").unwrap();
    assert!(score <= 0.3);
}

#[test]
fn test_sigmoid() {
    assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
    assert!(sigmoid(10.0) > 0.99);
    assert!(sigmoid(-10.0) < 0.01);
}

#[test]
fn test_service_lazy_load() {
    let service = RerankerService::new(RerankerConfig::stub());
    assert!(!service.is_loaded());
    assert!(service.is_stub());

    let score = service.score("hotel", "hotel policy").unwrap();
    assert!(score > 0.0);
    assert!(service.is_loaded());
}

#[test]
fn test_service_load_failure_surfaces_as_error() {
    let service = RerankerService::new(RerankerConfig::new("/nonexistent/reranker"));
    assert!(service.score("q", "c").is_err());
    assert!(!service.is_loaded());
}

#[test]
fn test_mock_scorer_table_and_failure() {
    let scorer = MockPairScorer::new()
        .with_score("A", 0.8)
        .with_default_score(0.1);

    assert_eq!(scorer.score("q", " A ").unwrap(), 0.8);
    assert_eq!(scorer.score("q", "B").unwrap(), 0.1);
    assert_eq!(scorer.calls(), 2);

    scorer.set_failing(true);
    assert!(scorer.score("q", "A").is_err());
    assert_eq!(scorer.calls(), 3);
}
