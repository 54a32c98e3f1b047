use std::sync::Arc;

use tripguard::corpus::{MockCorpusStore, Passage};
use tripguard::embedding::{EncoderConfig, MockPairScorer, TextEncoder};
use tripguard::evaluation::TestCase;
use tripguard::pipeline::{HybridRetriever, RetrievalConfig};

pub const HOTEL: &str = "Hotel cap is 500 per night in tier-1 cities.";
pub const MEALS: &str = "Meal allowance is 100 per day.";
pub const FLIGHTS: &str = "Economy class is required for flights under six hours.";
pub const TAXI: &str = "Taxi receipts must be itemised and attached.";

/// `(text, source file, zero-based page)`.
pub const POLICY: [(&str, &str, Option<u32>); 4] = [
    (HOTEL, "/policies/lodging.pdf", Some(2)),
    (MEALS, "/policies/meals.txt", None),
    (FLIGHTS, "/policies/air.pdf", Some(0)),
    (TAXI, "/policies/ground.txt", None),
];

pub fn stub_encoder() -> Arc<TextEncoder> {
    Arc::new(TextEncoder::load(EncoderConfig::stub()).expect("stub encoder always loads"))
}

pub fn seeded_store(encoder: &TextEncoder) -> Arc<MockCorpusStore> {
    let store = MockCorpusStore::new();
    for (text, source, page) in POLICY {
        let mut passage = Passage::new(text, source);
        passage.page = page;
        store.insert(passage, encoder.encode(text).expect("stub encoding"));
    }
    Arc::new(store)
}

/// Confident on hotel and flight passages, unsure on the rest.
pub fn policy_scorer() -> Arc<MockPairScorer> {
    Arc::new(
        MockPairScorer::new()
            .with_score(HOTEL, 0.93)
            .with_score(FLIGHTS, 0.81)
            .with_score(MEALS, 0.35)
            .with_score(TAXI, 0.12),
    )
}

pub fn retriever_with(scorer: Arc<MockPairScorer>) -> (HybridRetriever, Arc<MockCorpusStore>) {
    let encoder = stub_encoder();
    let store = seeded_store(&encoder);
    (
        HybridRetriever::new(encoder, store.clone(), scorer, RetrievalConfig::default()),
        store,
    )
}

pub fn dataset() -> Vec<TestCase> {
    vec![
        TestCase::answerable(
            "What is the hotel cap per night?",
            "500 per night",
            vec![HOTEL.to_string()],
        ),
        TestCase::answerable(
            "Which class can I fly on a four hour flight?",
            "Economy class",
            vec![FLIGHTS.to_string()],
        ),
        TestCase::unanswerable("Can I expense a yacht charter?"),
    ]
}

pub fn dataset_json() -> String {
    serde_json::to_string_pretty(&dataset()).expect("dataset serializes")
}
