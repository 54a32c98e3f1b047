use std::sync::Arc;

use super::*;
use crate::corpus::{CorpusError, MockCorpusStore, Passage};
use crate::embedding::{EncoderConfig, EncoderService, QueryEncoder};

const POLICY: [(&str, &str); 5] = [
    ("Hotel cap is 500 per night in tier-1 cities.", "lodging.txt"),
    ("Meal allowance is 100 per day.", "meals.txt"),
    ("Economy class is required for flights under six hours.", "air.txt"),
    ("Taxi receipts must be itemised and attached.", "ground.txt"),
    ("一线城市住宿标准为每晚500元。", "住宿.txt"),
];

fn seeded(encoder: &EncoderService) -> Arc<MockCorpusStore> {
    let store = MockCorpusStore::new();
    for (text, source) in POLICY {
        store.insert(Passage::new(text, source), encoder.encode(text).unwrap());
    }
    Arc::new(store)
}

fn passages(texts: &[&str]) -> Vec<Passage> {
    texts.iter().map(|t| Passage::new(*t, "doc.txt")).collect()
}

fn texts(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.text()).collect()
}

#[test]
fn test_bm25_ranks_matching_document_first() {
    let index = Bm25Index::build(&POLICY.map(|(t, _)| t));
    let top = index.top_k("meal allowance per day", 3);

    assert_eq!(top[0].0, 1);
    assert!(top.iter().all(|(_, s)| *s > 0.0));
}

#[test]
fn test_bm25_omits_zero_score_documents() {
    let index = Bm25Index::build(&POLICY.map(|(t, _)| t));
    let top = index.top_k("taxi", 10);

    assert_eq!(top.len(), 1);
    assert_eq!(top[0].0, 3);
}

#[test]
fn test_bm25_no_match_is_empty() {
    let index = Bm25Index::build(&POLICY.map(|(t, _)| t));
    assert!(index.top_k("submarine", 5).is_empty());
}

#[test]
fn test_bm25_ties_keep_corpus_order() {
    let index = Bm25Index::build(&["visa fee", "visa fee", "visa fee"]);
    let top = index.top_k("visa", 3);
    assert_eq!(top.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn test_bm25_idf_is_non_negative_and_rarer_is_higher() {
    let index = Bm25Index::build(&["visa fee", "visa", "visa hotel"]);
    assert!(index.idf("visa") > 0.0);
    assert!(index.idf("hotel") > index.idf("visa"));
    assert!(index.idf("unseen") > index.idf("hotel"));
}

#[test]
fn test_bm25_prefers_shorter_document_at_equal_tf() {
    let index = Bm25Index::build(&[
        "hotel",
        "hotel booking must be made through the approved agency portal",
    ]);
    let scores = index.scores("hotel");
    assert!(scores[0] > scores[1]);
}

#[test]
fn test_bm25_cjk_query() {
    let index = Bm25Index::build(&POLICY.map(|(t, _)| t));
    let top = index.top_k("住宿标准", 2);
    assert_eq!(top[0].0, 4);
}

#[test]
fn test_bm25_empty_corpus() {
    let index = Bm25Index::build::<&str>(&[]);
    assert!(index.is_empty());
    assert!(index.top_k("hotel", 3).is_empty());
}

#[test]
fn test_merge_semantic_first_then_lexical() {
    let merged = merge(passages(&["A", "B"]), passages(&["C", "A", "D"]));

    assert_eq!(texts(&merged), vec!["A", "B", "C", "D"]);
    assert_eq!(merged[0].origin, Origin::Semantic);
    assert_eq!(merged[2].origin, Origin::Lexical);
}

#[test]
fn test_merge_dedup_uses_trimmed_text() {
    let merged = merge(passages(&["  A  "]), passages(&["A", "A\n"]));
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].origin, Origin::Semantic);
}

#[test]
fn test_merge_is_idempotent() {
    let once = merge(passages(&["A", "B", "A"]), passages(&["B", "C"]));
    let again = merge(
        once.iter().map(|c| c.passage.clone()).collect(),
        Vec::new(),
    );
    assert_eq!(texts(&once), texts(&again));
}

#[test]
fn test_merge_list_with_itself_yields_original() {
    let list = passages(&["A", "B", "C"]);
    let merged = merge(list.clone(), list.clone());
    assert_eq!(texts(&merged), vec!["A", "B", "C"]);
}

#[test]
fn test_merge_empty_inputs() {
    assert!(merge(Vec::new(), Vec::new()).is_empty());
}

#[test]
fn test_dedup_keeps_first_origin() {
    let deduped = dedup(vec![
        Candidate::new(Passage::new("A", "x"), Origin::Lexical),
        Candidate::new(Passage::new("A", "y"), Origin::Semantic),
    ]);
    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].origin, Origin::Lexical);
    assert_eq!(deduped[0].passage.source, "x");
}

#[tokio::test]
async fn test_semantic_search_returns_nearest() {
    let encoder = Arc::new(EncoderService::new(EncoderConfig::stub()));
    let store = seeded(&encoder);
    let retriever = SemanticRetriever::new(encoder, store);

    let hits = retriever.search("taxi receipts", 2).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].source, "ground.txt");
}

#[tokio::test]
async fn test_semantic_search_zero_k() {
    let encoder = Arc::new(EncoderService::new(EncoderConfig::stub()));
    let store = seeded(&encoder);
    let retriever = SemanticRetriever::new(encoder, store);

    assert!(retriever.search("taxi", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_semantic_search_surfaces_missing_collection() {
    let encoder = Arc::new(EncoderService::new(EncoderConfig::stub()));
    let store = seeded(&encoder);
    store.set_unavailable(true);
    let retriever = SemanticRetriever::new(encoder, store);

    let err = retriever.search("taxi", 3).await.unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::Corpus(CorpusError::CollectionNotFound { .. })
    ));
}

#[tokio::test]
async fn test_lexical_search_over_store() {
    let encoder = EncoderService::new(EncoderConfig::stub());
    let store = seeded(&encoder);
    let retriever = LexicalRetriever::new(store);

    let hits = retriever.search("economy flights", 5).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, "air.txt");
}

#[tokio::test]
async fn test_lexical_search_sees_new_passages() {
    let encoder = EncoderService::new(EncoderConfig::stub());
    let store = seeded(&encoder);
    let retriever = LexicalRetriever::new(store.clone());

    assert!(retriever.search("visa", 3).await.unwrap().is_empty());

    store.insert(
        Passage::new("Visa fees are reimbursable.", "visa.txt"),
        encoder.encode("Visa fees are reimbursable.").unwrap(),
    );

    let hits = retriever.search("visa", 3).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, "visa.txt");
}

#[tokio::test]
async fn test_lexical_search_empty_corpus() {
    let retriever = LexicalRetriever::new(Arc::new(MockCorpusStore::new()));
    assert!(retriever.search("hotel", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lexical_search_surfaces_missing_collection() {
    let store = Arc::new(MockCorpusStore::new());
    store.set_unavailable(true);
    let retriever = LexicalRetriever::new(store);

    assert!(retriever.search("hotel", 3).await.is_err());
}
