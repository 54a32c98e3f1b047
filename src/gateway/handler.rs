use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error::GatewayError;
use super::state::HandlerState;
use super::{TRIPGUARD_STATUS_FOUND, TRIPGUARD_STATUS_HEADER, TRIPGUARD_STATUS_NO_MATCH};
use crate::hashing::query_fingerprint;
use crate::pipeline::format_passages;
use crate::scoring::ScoredCandidate;

#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageView {
    pub rank: usize,
    pub source: String,
    pub content: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub query: String,
    /// Same text `HybridRetriever::lookup` returns.
    pub result: String,
    pub passages: Vec<PassageView>,
}

impl LookupResponse {
    pub fn new(query: String, results: &[ScoredCandidate]) -> Self {
        let passages = results
            .iter()
            .enumerate()
            .map(|(i, c)| PassageView {
                rank: i + 1,
                source: c.passage.label(),
                content: c.passage.text.trim().to_string(),
                score: c.rerank_score,
            })
            .collect();

        Self {
            result: format_passages(results),
            query,
            passages,
        }
    }
}

pub(crate) fn validate_query(query: &str) -> Result<&str, GatewayError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "query must not be blank".to_string(),
        ));
    }
    Ok(query)
}

#[instrument(skip(state, request), fields(query_id = tracing::field::Empty))]
pub async fn lookup_handler(
    State(state): State<HandlerState>,
    Json(request): Json<LookupRequest>,
) -> Result<Response, GatewayError> {
    let query = validate_query(&request.query)?.to_string();
    tracing::Span::current().record("query_id", query_fingerprint(&query));

    let results = state.retriever.search(&query).await?;
    debug!(results = results.len(), "Lookup complete");

    let status = if results.is_empty() {
        TRIPGUARD_STATUS_NO_MATCH
    } else {
        TRIPGUARD_STATUS_FOUND
    };
    let mut headers = HeaderMap::new();
    headers.insert(TRIPGUARD_STATUS_HEADER, HeaderValue::from_static(status));

    Ok((
        StatusCode::OK,
        headers,
        Json(LookupResponse::new(query, &results)),
    )
        .into_response())
}
