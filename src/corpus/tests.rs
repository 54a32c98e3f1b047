use std::collections::HashMap;

use qdrant_client::qdrant::Value;

use super::*;

fn unit(values: &[f32]) -> Vec<f32> {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    values.iter().map(|v| v / norm).collect()
}

fn seeded_store() -> MockCorpusStore {
    let store = MockCorpusStore::new();
    store.insert(
        Passage::new("Hotel cap is 500 per night.", "policy/lodging.txt"),
        unit(&[1.0, 0.0, 0.0]),
    );
    store.insert(
        Passage::new("Meal allowance is 100 per day.", "policy/meals.txt"),
        unit(&[0.0, 1.0, 0.0]),
    );
    store.insert(
        Passage::new("Economy class for flights under 6 hours.", "policy/air.pdf").with_page(2),
        unit(&[0.7, 0.7, 0.0]),
    );
    store
}

#[test]
fn test_label_uses_file_name() {
    let passage = Passage::new("x", "/data/policy/travel_policy.txt");
    assert_eq!(passage.label(), "travel_policy.txt");
}

#[test]
fn test_label_page_suffix_is_one_indexed() {
    let passage = Passage::new("x", "handbook.pdf").with_page(0);
    assert_eq!(passage.label(), "handbook.pdf (p1)");

    let passage = Passage::new("x", "handbook.pdf").with_page(11);
    assert_eq!(passage.label(), "handbook.pdf (p12)");
}

#[test]
fn test_label_empty_source_falls_back() {
    let passage = Passage::new("x", "");
    assert_eq!(passage.label(), crate::constants::UNKNOWN_SOURCE);
}

#[test]
fn test_dedup_key_trims() {
    let a = Passage::new("  same text ", "a.txt");
    let b = Passage::new("same text", "b.txt");
    assert_eq!(a.dedup_key(), b.dedup_key());
}

#[test]
fn test_from_payload_reads_keys() {
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert("page_content".to_string(), "Taxi receipts required.".to_string().into());
    payload.insert("source".to_string(), "rules.pdf".to_string().into());
    payload.insert("page".to_string(), 4_i64.into());

    let passage = Passage::from_payload(&payload).expect("text present");
    assert_eq!(passage.text, "Taxi receipts required.");
    assert_eq!(passage.source, "rules.pdf");
    assert_eq!(passage.page, Some(4));
    assert_eq!(passage.label(), "rules.pdf (p5)");
}

#[test]
fn test_from_payload_without_text_is_skipped() {
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert("source".to_string(), "rules.pdf".to_string().into());
    assert!(Passage::from_payload(&payload).is_none());
}

#[test]
fn test_from_payload_missing_source_and_negative_page() {
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert("page_content".to_string(), "text".to_string().into());
    payload.insert("page".to_string(), (-1_i64).into());

    let passage = Passage::from_payload(&payload).unwrap();
    assert_eq!(passage.source, crate::constants::UNKNOWN_SOURCE);
    assert_eq!(passage.page, None);
}

#[tokio::test]
async fn test_mock_nearest_orders_by_similarity() {
    let store = seeded_store();

    let results = store.nearest(&unit(&[1.0, 0.1, 0.0]), 2).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.text, "Hotel cap is 500 per night.");
    assert!(results[0].1 >= results[1].1);
}

#[tokio::test]
async fn test_mock_nearest_caps_at_k() {
    let store = seeded_store();
    let results = store.nearest(&unit(&[0.0, 0.0, 1.0]), 10).await.unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_mock_nearest_dimension_mismatch() {
    let store = seeded_store();
    let err = store.nearest(&[1.0, 0.0], 3).await.unwrap_err();
    assert!(matches!(
        err,
        CorpusError::InvalidDimension {
            expected: 3,
            actual: 2
        }
    ));
}

#[tokio::test]
async fn test_mock_list_all_keeps_insert_order() {
    let store = seeded_store();
    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].source, "policy/lodging.txt");
    assert_eq!(all[2].page, Some(2));
}

#[tokio::test]
async fn test_mock_unavailable_collection() {
    let store = seeded_store();
    store.set_unavailable(true);

    assert!(matches!(
        store.list_all().await,
        Err(CorpusError::CollectionNotFound { .. })
    ));
    assert!(matches!(
        store.nearest(&unit(&[1.0, 0.0, 0.0]), 1).await,
        Err(CorpusError::CollectionNotFound { .. })
    ));
}

#[test]
fn test_cosine_similarity_edge_cases() {
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
}

#[test]
fn test_qdrant_store_is_lazy() {
    let store = QdrantCorpusStore::new("http://localhost:6334", "policy");
    assert!(!store.is_connected());
    assert_eq!(store.collection(), "policy");
    assert_eq!(store.url(), "http://localhost:6334");
}
