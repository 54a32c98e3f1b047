use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{ScrollPointsBuilder, SearchPointsBuilder};
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::CorpusError;
use super::model::Passage;
use crate::lazy::LazyService;

/// Page size used when scrolling the whole collection.
pub const SCROLL_PAGE_SIZE: u32 = 256;

/// Read-only access to the indexed policy corpus.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Returns every passage in the collection, in storage order.
    async fn list_all(&self) -> Result<Vec<Passage>, CorpusError>;

    /// Returns at most `k` passages nearest to `query`, most similar first.
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(Passage, f32)>, CorpusError>;

    /// Collection name (for logs and error messages).
    fn collection(&self) -> &str;
}

/// Qdrant-backed corpus; the client handle is built on first use.
pub struct QdrantCorpusStore {
    url: String,
    collection: String,
    client: LazyService<Qdrant>,
}

impl std::fmt::Debug for QdrantCorpusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantCorpusStore")
            .field("url", &self.url)
            .field("collection", &self.collection)
            .field("connected", &self.client.is_initialized())
            .finish()
    }
}

impl QdrantCorpusStore {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            collection: collection.into(),
            client: LazyService::new("qdrant"),
        }
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `true` once the client handle has been built.
    pub fn is_connected(&self) -> bool {
        self.client.is_initialized()
    }

    /// Builds the client and checks that the collection exists.
    pub async fn connect(&self) -> Result<(), CorpusError> {
        let client = self.client()?;
        self.ensure_collection(&client).await
    }

    fn client(&self) -> Result<Arc<Qdrant>, CorpusError> {
        self.client.get_or_try_init(|| {
            Qdrant::from_url(&self.url)
                .build()
                .map_err(|e| CorpusError::ConnectionFailed {
                    url: self.url.clone(),
                    message: e.to_string(),
                })
        })
    }

    async fn ensure_collection(&self, client: &Qdrant) -> Result<(), CorpusError> {
        let exists = client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| CorpusError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        if !exists {
            warn!(collection = %self.collection, "Policy collection does not exist");
            return Err(CorpusError::CollectionNotFound {
                collection: self.collection.clone(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl CorpusStore for QdrantCorpusStore {
    async fn list_all(&self) -> Result<Vec<Passage>, CorpusError> {
        let client = self.client()?;
        self.ensure_collection(&client).await?;

        let mut passages = Vec::new();
        let mut offset = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .limit(SCROLL_PAGE_SIZE)
                .with_payload(true)
                .with_vectors(false);
            if let Some(point_id) = offset.take() {
                builder = builder.offset(point_id);
            }

            let page = client
                .scroll(builder)
                .await
                .map_err(|e| CorpusError::ScrollFailed {
                    collection: self.collection.clone(),
                    message: e.to_string(),
                })?;

            passages.extend(
                page.result
                    .iter()
                    .filter_map(|point| Passage::from_payload(&point.payload)),
            );

            match page.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(
            collection = %self.collection,
            passages = passages.len(),
            "Scrolled full corpus"
        );

        Ok(passages)
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(Passage, f32)>, CorpusError> {
        let client = self.client()?;
        self.ensure_collection(&client).await?;

        let response = client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.to_vec(), k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| CorpusError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let results = response
            .result
            .into_iter()
            .filter_map(|point| Passage::from_payload(&point.payload).map(|p| (p, point.score)))
            .collect();

        Ok(results)
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
