use super::llm::{build_prompt, parse_verdict};
use super::*;

const LONG_TEXT: &str =
    "Employees travelling to tier-1 cities may book hotels up to 500 per night with approval.";

#[test]
fn test_parse_verdict() {
    assert!(parse_verdict("yes"));
    assert!(parse_verdict("  Yes, it does.\n"));
    assert!(parse_verdict("是"));
    assert!(!parse_verdict("no"));
    assert!(!parse_verdict("否"));
    assert!(!parse_verdict(""));
}

#[test]
fn test_answerable_prompt_carries_reference() {
    let request = JudgeRequest::answerable("hotel cap?", "500 per night", "Hotel cap is 500.")
        .with_reference_context("Hotel cap is 500 per night.");
    let prompt = build_prompt(&request);

    assert!(prompt.contains("Question: hotel cap?"));
    assert!(prompt.contains("Reference answer: 500 per night"));
    assert!(prompt.contains("Reference evidence: Hotel cap is 500 per night."));
    assert!(prompt.contains("Retrieved passage: Hotel cap is 500."));
}

#[test]
fn test_unanswerable_prompt_omits_reference() {
    let prompt = build_prompt(&JudgeRequest::unanswerable("moon travel?", "Meals are 100."));
    assert!(!prompt.contains("Reference answer"));
    assert!(prompt.contains("Retrieved passage: Meals are 100."));
}

#[test]
fn test_heuristic_answerable_whole_answer() {
    let request = JudgeRequest::answerable("q", "500 per night", "Hotel cap is 500 per night.");
    assert!(HeuristicJudge::decide(&request));
}

#[test]
fn test_heuristic_answerable_leading_clause() {
    let request = JudgeRequest::answerable(
        "q",
        "经理审批，每晚500元，需要发票，另需备案",
        "住宿标准：每晚500元。",
    );
    assert!(HeuristicJudge::decide(&request));
}

#[test]
fn test_heuristic_answerable_ignores_fourth_clause() {
    let request = JudgeRequest::answerable("q", "a1, b2, c3, receipts", "receipts only");
    assert!(!HeuristicJudge::decide(&request));
}

#[test]
fn test_heuristic_answerable_empty_reference_is_irrelevant() {
    assert!(!HeuristicJudge::decide(&JudgeRequest::answerable(
        "q",
        "",
        LONG_TEXT
    )));
}

#[test]
fn test_heuristic_unanswerable_flags_long_text() {
    assert!(HeuristicJudge::decide(&JudgeRequest::unanswerable("q", LONG_TEXT)));
    assert!(!HeuristicJudge::decide(&JudgeRequest::unanswerable(
        "q",
        "   short   "
    )));
}

#[tokio::test]
async fn test_fallback_used_when_judge_fails() {
    let judge = MockJudge::new().relevant_when("nothing matches this");
    judge.set_failing(true);

    let request = JudgeRequest::answerable("q", "500 per night", "Hotel cap is 500 per night.");
    assert!(judge_or_fallback(&judge, &request).await);

    let request = JudgeRequest::unanswerable("q", LONG_TEXT);
    assert!(judge_or_fallback(&judge, &request).await);
    assert_eq!(judge.calls(), 2);
}

#[tokio::test]
async fn test_judge_verdict_used_when_available() {
    let judge = MockJudge::new().relevant_when("cap");

    let request = JudgeRequest::answerable("q", "unrelated", "Hotel cap is 500.");
    assert!(judge_or_fallback(&judge, &request).await);

    let request = JudgeRequest::unanswerable("q", LONG_TEXT);
    assert!(!judge_or_fallback(&judge, &request).await);
}

#[tokio::test]
async fn test_mock_judge_records_framing() {
    let judge = MockJudge::new().misleading_when("hotel");
    let verdict = judge
        .judge(&JudgeRequest::unanswerable("q", "hotel rules"))
        .await
        .unwrap();

    assert!(verdict);
    assert_eq!(
        judge.judged(),
        vec![(Framing::Unanswerable, "hotel rules".to_string())]
    );
}
