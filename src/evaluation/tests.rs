use std::sync::Arc;

use super::*;
use crate::corpus::{MockCorpusStore, Passage};
use crate::embedding::{EncoderConfig, MockPairScorer, TextEncoder};
use crate::pipeline::{HybridRetriever, RetrievalConfig};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_metrics_basic() {
    let verdicts = [false, true, false, true];
    assert_eq!(metrics::first_relevant(&verdicts), Some(1));
    assert_eq!(metrics::precision(&verdicts), 0.5);
    assert_eq!(metrics::reciprocal_rank(&verdicts), 0.5);
    assert_eq!(metrics::precision(&[]), 0.0);
    assert_eq!(metrics::reciprocal_rank(&[false, false]), 0.0);
}

#[test]
fn test_ndcg() {
    assert_eq!(metrics::ndcg(&[true, false, false]), 1.0);
    assert_eq!(metrics::ndcg(&[false, false]), 0.0);
    assert_eq!(metrics::ndcg(&[]), 0.0);

    let expected = (1.0 / 3f64.log2()) / 1.0;
    assert!((metrics::ndcg(&[false, true]) - expected).abs() < 1e-12);

    let ideal = metrics::ndcg(&[true, true, false]);
    let worse = metrics::ndcg(&[false, true, true]);
    assert_eq!(ideal, 1.0);
    assert!(worse < ideal);
}

#[test]
fn test_recall_at() {
    let hits = [Some(0), Some(4), None];
    assert!((metrics::recall_at(&hits, 1) - 1.0 / 3.0).abs() < 1e-12);
    assert!((metrics::recall_at(&hits, 5) - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(metrics::recall_at(&[], 3), 0.0);
}

#[test]
fn test_noise_robustness_metric() {
    assert_eq!(metrics::noise_robustness(&[]), 1.0);
    assert_eq!(metrics::noise_robustness(&[false, false]), 1.0);
    assert_eq!(metrics::noise_robustness(&[false, true]), 0.0);
}

#[tokio::test]
async fn test_unanswerable_all_irrelevant_is_robust() {
    let judge = MockJudge::new().misleading_when("visa");
    let case = TestCase::unanswerable("Can I expense a spaceship?");
    let retrieved = texts(&["Hotel cap is 500.", "Meals are 100.", "Taxi receipts.", "visa"]);

    let nr = judge_unanswerable(&judge, &case, &retrieved, 3).await;

    assert_eq!(nr, 1.0);
    assert_eq!(judge.calls(), 3);
    assert!(
        judge
            .judged()
            .iter()
            .all(|(framing, _)| *framing == Framing::Unanswerable)
    );
}

#[tokio::test]
async fn test_unanswerable_with_misleading_candidate() {
    let judge = MockJudge::new().misleading_when("Meals");
    let case = TestCase::unanswerable("Can I expense a spaceship?");
    let retrieved = texts(&["Hotel cap is 500.", "Meals are 100.", "Taxi receipts."]);

    assert_eq!(judge_unanswerable(&judge, &case, &retrieved, 3).await, 0.0);
}

#[tokio::test]
async fn test_answerable_second_candidate_relevant() {
    let judge = MockJudge::new().relevant_when("X");
    let case = TestCase::answerable("q", "answer", vec!["X".to_string()]);
    let retrieved = texts(&["a", "X marks it", "b", "c", "d"]);

    let outcome = judge_answerable(&judge, &case, &retrieved, &[1, 3, 5]).await;

    assert_eq!(outcome.recall[&1], 0.0);
    assert_eq!(outcome.recall[&3], 1.0);
    assert_eq!(outcome.recall[&5], 1.0);
    assert_eq!(outcome.reciprocal_rank, 0.5);
    assert_eq!(outcome.precision, 0.2);
}

#[tokio::test]
async fn test_recall_is_fraction_of_reference_contexts_matched() {
    let judge = MockJudge::new()
        .relevant_when("Hotel")
        .supports("Hotel cap is 500.", "Hotel")
        .supports("Visa fees are reimbursed.", "Visa");
    let case = TestCase::answerable(
        "What does the company cover?",
        "hotel and visa",
        vec![
            "Hotel cap is 500.".to_string(),
            "Visa fees are reimbursed.".to_string(),
        ],
    );
    let retrieved = texts(&["Hotel cap is 500 per night.", "Meals are 100.", "Taxi receipts."]);

    let outcome = judge_answerable(&judge, &case, &retrieved, &[1, 3]).await;

    assert_eq!(outcome.recall[&1], 0.5);
    assert_eq!(outcome.recall[&3], 0.5);
    assert_eq!(outcome.reciprocal_rank, 1.0);
}

#[tokio::test]
async fn test_recall_counts_each_reference_at_its_own_rank() {
    let judge = MockJudge::new()
        .supports("Hotel cap is 500.", "Hotel")
        .supports("Visa fees are reimbursed.", "Visa");
    let case = TestCase::answerable(
        "What does the company cover?",
        "hotel and visa",
        vec![
            "Hotel cap is 500.".to_string(),
            "Visa fees are reimbursed.".to_string(),
        ],
    );
    let retrieved = texts(&["Hotel cap is 500 per night.", "Meals are 100.", "Visa fees: yes."]);

    let outcome = judge_answerable(&judge, &case, &retrieved, &[1, 2, 3]).await;

    assert_eq!(outcome.recall[&1], 0.5);
    assert_eq!(outcome.recall[&2], 0.5);
    assert_eq!(outcome.recall[&3], 1.0);
}

#[tokio::test]
async fn test_recall_non_decreasing_in_k() {
    let judge = MockJudge::new().relevant_when("hit");
    let case = TestCase::answerable(
        "q",
        "answer",
        vec!["one".to_string(), "two".to_string()],
    );
    let retrieved = texts(&["miss", "miss", "hit", "miss", "hit", "miss"]);
    let k_values = [1, 2, 3, 4, 5, 6];

    let outcome = judge_answerable(&judge, &case, &retrieved, &k_values).await;
    let recalls: Vec<f64> = k_values.iter().map(|k| outcome.recall[k]).collect();

    assert!(recalls.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(recalls[2], 1.0);
}

#[tokio::test]
async fn test_recall_judges_only_up_to_max_k() {
    let judge = MockJudge::new();
    let case = TestCase::answerable("q", "answer", vec!["ref".to_string()]);
    let retrieved = texts(&["a", "b", "c", "d", "e"]);

    judge_answerable(&judge, &case, &retrieved, &[2]).await;

    // 2 recall calls + 5 ranking calls
    assert_eq!(judge.calls(), 7);
}

#[test]
fn test_scorecard_failures_record_worst_case() {
    let mut scores = Scorecard::new(&[3, 5]);
    scores.record_answerable(&AnswerableOutcome {
        recall: [(3, 1.0), (5, 1.0)].into_iter().collect(),
        precision: 1.0,
        reciprocal_rank: 1.0,
        ndcg: 1.0,
    });
    scores.record_failure(true);
    scores.record_unanswerable(1.0);
    scores.record_failure(false);

    assert_eq!(scores.recall_at(3), 0.5);
    assert_eq!(scores.mrr(), 0.5);
    assert_eq!(scores.noise_robustness(), 0.5);
    assert_eq!(scores.failures, 2);
    assert_eq!(scores.total(), 4);
    assert_eq!(scores.success_rate(), 0.5);
    assert_eq!(scores.recall_at(10), 0.0);
}

#[test]
fn test_evaluation_config() {
    let config = EvaluationConfig::default().with_k_values([10, 3, 5, 3]);
    assert_eq!(config.k_values, vec![3, 5, 10]);
    assert_eq!(config.max_k(), 10);
    assert_eq!(config.min_k(), 3);
    assert!(config.validate().is_ok());
    assert!(EvaluationConfig::default().with_k_values(Vec::new()).validate().is_err());
    assert!(EvaluationConfig::default().with_k_values([0, 3]).validate().is_err());
}

#[test]
fn test_parse_dataset_fields() {
    let cases = parse_dataset(
        r#"[
            {"question": "hotel cap?", "ground_truth": "500", "ground_truth_context": ["Hotel cap is 500."]},
            {"question": "spaceship?", "ground_truth": "", "ground_truth_context": []},
            {"question": "no answer text", "ground_truth_context": []}
        ]"#,
    )
    .unwrap();

    assert_eq!(cases.len(), 3);
    assert!(cases[0].is_answerable());
    assert_eq!(cases[0].reference_answer, "500");
    assert!(!cases[1].is_answerable());
    assert!(!cases[2].is_answerable());
    assert_eq!(cases[2].reference_answer, "");
}

#[test]
fn test_parse_dataset_requires_context_field() {
    let misspelled = parse_dataset(
        r#"[{"question": "hotel cap?", "ground_truth": "500", "ground_truth_contexts": ["Hotel cap is 500"]}]"#,
    );
    assert!(misspelled.is_err());

    assert!(parse_dataset(r#"[{"question": "no labels"}]"#).is_err());
}

#[test]
fn test_load_dataset_missing_context_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cases.json");
    std::fs::write(&path, r#"[{"question": "hotel cap?", "ground_truth": "500"}]"#).unwrap();

    assert!(matches!(load_dataset(&path), Err(DatasetError::Parse { .. })));
}

#[test]
fn test_load_dataset_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(load_dataset(&missing), Err(DatasetError::Io { .. })));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{not json").unwrap();
    assert!(matches!(load_dataset(&bad), Err(DatasetError::Parse { .. })));

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, "[]").unwrap();
    assert!(matches!(load_dataset(&empty), Err(DatasetError::Empty { .. })));
}

const HOTEL: &str = "Hotel cap is 500 per night in tier-1 cities.";
const MEALS: &str = "Meal allowance is 100 per day.";
const TAXI: &str = "Taxi receipts must be itemised and attached.";

fn retriever() -> (HybridRetriever, Arc<MockCorpusStore>) {
    let encoder = Arc::new(TextEncoder::load(EncoderConfig::stub()).unwrap());
    let store = MockCorpusStore::new();
    for (text, source) in [(HOTEL, "lodging.txt"), (MEALS, "meals.txt"), (TAXI, "ground.txt")] {
        store.insert(Passage::new(text, source), encoder.encode(text).unwrap());
    }
    let store = Arc::new(store);
    let scorer = Arc::new(
        MockPairScorer::new()
            .with_score(HOTEL, 0.9)
            .with_score(MEALS, 0.4)
            .with_score(TAXI, 0.2),
    );
    (
        HybridRetriever::new(encoder, store.clone(), scorer, RetrievalConfig::default()),
        store,
    )
}

fn harness(judge: Arc<MockJudge>, config: EvaluationConfig) -> (EvaluationHarness, Arc<MockCorpusStore>) {
    let (retriever, store) = retriever();
    (
        EvaluationHarness::new(retriever, judge, config).unwrap(),
        store,
    )
}

#[tokio::test]
async fn test_reranked_mode_applies_cutoff() {
    let (harness, _) = harness(Arc::new(MockJudge::new()), EvaluationConfig::default());

    let texts = harness.retrieve(Mode::Reranked, "hotel cap", 10).await.unwrap();
    assert_eq!(texts, vec![HOTEL.to_string()]);
}

#[tokio::test]
async fn test_reranked_mode_abstains_below_overlay() {
    let (harness, _) = harness(
        Arc::new(MockJudge::new()),
        EvaluationConfig::default().with_overlay_threshold(0.95),
    );

    assert!(harness.retrieve(Mode::Reranked, "hotel cap", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fused_mode_truncates_to_k() {
    let (harness, _) = harness(Arc::new(MockJudge::new()), EvaluationConfig::default());

    let texts = harness.retrieve(Mode::Fused, "per", 1).await.unwrap();
    assert_eq!(texts.len(), 1);
}

#[tokio::test]
async fn test_run_all_modes() {
    let judge = Arc::new(
        MockJudge::new()
            .relevant_when("Hotel cap")
            .misleading_when("Taxi"),
    );
    let (harness, _) = harness(judge, EvaluationConfig::default().with_k_values([1, 3]));
    let cases = vec![
        TestCase::answerable(
            "What is the hotel cap per night?",
            "500 per night",
            vec![HOTEL.to_string()],
        ),
        TestCase::unanswerable("Can I expense a spaceship launch?"),
    ];

    let report = harness.run(&cases).await.unwrap();

    assert_eq!(report.modes.len(), 4);
    assert_eq!(report.answerable, 1);
    assert_eq!(report.unanswerable, 1);

    let reranked = report.mode(Mode::Reranked).unwrap();
    assert_eq!(reranked.scores.recall_at(1), 1.0);
    assert_eq!(reranked.scores.precision(), 1.0);
    assert_eq!(reranked.scores.noise_robustness(), 1.0);
    assert_eq!(reranked.scores.failures, 0);

    let markdown = report.to_markdown();
    assert!(markdown.contains("| Mode | Recall@1 | Recall@3 |"));
    assert!(markdown.contains("hybrid + rerank"));
    assert!(markdown.contains("Reranker contribution"));
    assert_eq!(report.rerank_contribution().len(), 5);
    assert_eq!(report.lexical_contribution().len(), 2);
}

#[tokio::test]
async fn test_backend_failure_counts_every_case() {
    let (harness, store) = harness(Arc::new(MockJudge::new()), EvaluationConfig::default());
    store.set_unavailable(true);
    let cases = vec![
        TestCase::answerable("hotel cap?", "500", vec![HOTEL.to_string()]),
        TestCase::unanswerable("spaceship?"),
    ];

    let result = harness.run_mode(Mode::Semantic, &cases, true).await;

    assert_eq!(result.scores.failures, 2);
    assert_eq!(result.scores.recall_at(3), 0.0);
    assert_eq!(result.scores.noise_robustness(), 0.0);
    assert_eq!(result.scores.success_rate(), 0.0);
}

#[tokio::test]
async fn test_run_rejects_empty_dataset() {
    let (harness, _) = harness(Arc::new(MockJudge::new()), EvaluationConfig::default());
    assert!(matches!(
        harness.run(&[]).await,
        Err(EvaluationError::EmptyDataset)
    ));
}

#[test]
fn test_best_by_prefers_first_on_tie() {
    let modes = Mode::ALL
        .into_iter()
        .map(|mode| ModeResult {
            mode,
            scores: Scorecard::new(&[3]),
        })
        .collect();
    let report = EvaluationReport::new(vec![3], &[TestCase::unanswerable("q")], modes);

    assert_eq!(report.best_by(|m| m.scores.mrr()).unwrap().mode, Mode::Semantic);
}

#[test]
fn test_report_written_as_markdown_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let report = EvaluationReport::new(
        vec![3],
        &[TestCase::unanswerable("q")],
        vec![ModeResult {
            mode: Mode::Lexical,
            scores: Scorecard::new(&[3]),
        }],
    );

    let (md, json) = report.write_to(&dir.path().join("out")).unwrap();

    assert!(std::fs::read_to_string(md).unwrap().starts_with("# Retrieval evaluation report"));
    let parsed: EvaluationReport =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(parsed.modes[0].mode, Mode::Lexical);
}

#[test]
fn test_contribution_delta() {
    let c = Contribution {
        metric: "MRR".to_string(),
        baseline: 0.5,
        improved: 0.75,
    };
    assert_eq!(c.delta(), 0.25);
    assert_eq!(c.delta_pct(), 50.0);

    let zero = Contribution {
        metric: "MRR".to_string(),
        baseline: 0.0,
        improved: 0.5,
    };
    assert_eq!(zero.delta_pct(), 0.0);
}

fn diagnosis_cases() -> Vec<TestCase> {
    vec![
        TestCase::answerable("hotel cap?", "500", vec![HOTEL.to_string()]),
        TestCase::unanswerable("Can I expense a spaceship?"),
    ]
}

#[tokio::test]
async fn test_diagnose_reports_top_distractor_per_unanswerable_case() {
    let (retriever, _) = retriever();
    let judge = MockJudge::new().misleading_when("Hotel");

    let diagnosed = diagnose_hard_negatives(&retriever, &judge, &diagnosis_cases(), 10).await;

    assert_eq!(diagnosed.len(), 1);
    assert_eq!(diagnosed[0].question, "Can I expense a spaceship?");
    assert_eq!(
        diagnosed[0].diagnosis,
        Diagnosis::Distractor {
            score: 0.9,
            source: "lodging.txt".to_string(),
            preview: HOTEL.to_string(),
            judged_relevant: true,
            fallback: false,
        }
    );
    assert!(diagnosed[0].is_flagged());
    assert_eq!(
        judge.judged(),
        vec![(Framing::Unanswerable, HOTEL.to_string())]
    );
}

#[tokio::test]
async fn test_diagnose_ignores_overlay_threshold() {
    let scorer = Arc::new(MockPairScorer::new().with_default_score(-3.0));
    let encoder = Arc::new(TextEncoder::load(EncoderConfig::stub()).unwrap());
    let store = MockCorpusStore::new();
    store.insert(Passage::new(TAXI, "ground.txt"), encoder.encode(TAXI).unwrap());
    let retriever =
        HybridRetriever::new(encoder, Arc::new(store), scorer, RetrievalConfig::default());

    let diagnosed =
        diagnose_hard_negatives(&retriever, &MockJudge::new(), &diagnosis_cases(), 10).await;

    assert!(matches!(
        diagnosed[0].diagnosis,
        Diagnosis::Distractor { score, judged_relevant: false, .. } if score == -3.0
    ));
}

#[tokio::test]
async fn test_diagnose_judge_failure_uses_heuristic() {
    let (retriever, _) = retriever();
    let judge = MockJudge::new().misleading_when("Hotel");
    judge.set_failing(true);

    let diagnosed = diagnose_hard_negatives(&retriever, &judge, &diagnosis_cases(), 10).await;

    assert!(matches!(
        diagnosed[0].diagnosis,
        Diagnosis::Distractor {
            judged_relevant: false,
            fallback: true,
            ..
        }
    ));
}

#[tokio::test]
async fn test_diagnose_backend_failure_and_empty_corpus() {
    let (retriever, store) = retriever();
    store.set_unavailable(true);
    let failed =
        diagnose_hard_negatives(&retriever, &MockJudge::new(), &diagnosis_cases(), 10).await;
    assert!(matches!(failed[0].diagnosis, Diagnosis::Failed { .. }));

    let encoder = Arc::new(TextEncoder::load(EncoderConfig::stub()).unwrap());
    let empty = HybridRetriever::new(
        encoder,
        Arc::new(MockCorpusStore::new()),
        Arc::new(MockPairScorer::new()),
        RetrievalConfig::default(),
    );
    let judge = MockJudge::new();
    let diagnosed = diagnose_hard_negatives(&empty, &judge, &diagnosis_cases(), 10).await;
    assert_eq!(diagnosed[0].diagnosis, Diagnosis::Empty);
    assert_eq!(judge.calls(), 0);
}

#[test]
fn test_preview_flattens_and_truncates() {
    assert_eq!(diagnose::preview("  line one\nline two "), "line one line two");

    let long = "x".repeat(150);
    let cut = diagnose::preview(&long);
    assert_eq!(cut.chars().count(), diagnose::PREVIEW_CHARS + 3);
    assert!(cut.ends_with("..."));
}

#[tokio::test]
async fn test_hard_negative_report_markdown_and_files() {
    let (retriever, _) = retriever();
    let judge = MockJudge::new().misleading_when("Hotel");
    let diagnosed = diagnose_hard_negatives(&retriever, &judge, &diagnosis_cases(), 10).await;
    let report = HardNegativeReport::new(judge.name(), diagnosed);

    assert_eq!(report.flagged(), 1);
    let markdown = report.to_markdown();
    assert!(markdown.starts_with("# Hard negative diagnosis"));
    assert!(markdown.contains("- Distractors judged relevant: 1"));
    assert!(markdown.contains("| 1 | Can I expense a spaceship? | 0.9000 | lodging.txt | relevant |"));

    let dir = tempfile::tempdir().unwrap();
    let (md, json) = report.write_to(dir.path()).unwrap();
    assert!(md.ends_with("hard_negatives.md"));
    let parsed: HardNegativeReport =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(parsed, report);
}
