use std::collections::HashMap;
use std::path::Path;

use qdrant_client::qdrant::Value;
use serde::{Deserialize, Serialize};

use crate::constants::{PAYLOAD_PAGE_KEY, PAYLOAD_SOURCE_KEY, PAYLOAD_TEXT_KEY, UNKNOWN_SOURCE};
use crate::hashing::passage_key;

/// A single indexed unit of policy text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text as ingested.
    pub text: String,
    /// Originating document (path or file name).
    pub source: String,
    /// Zero-based page within a multi-page document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Passage {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            page: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Display label: file name, suffixed with ` (p<N>)` (1-indexed) when paged.
    pub fn label(&self) -> String {
        let file_name = Path::new(&self.source)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_SOURCE);

        match self.page {
            Some(page) => format!("{file_name} (p{})", page.saturating_add(1)),
            None => file_name.to_string(),
        }
    }

    /// Identity used for deduplication (trimmed text).
    pub fn dedup_key(&self) -> [u8; 32] {
        passage_key(&self.text)
    }

    /// Builds a passage from a Qdrant payload; `None` if the text field is missing.
    pub fn from_payload(payload: &HashMap<String, Value>) -> Option<Self> {
        let text = payload.get(PAYLOAD_TEXT_KEY).and_then(|v| v.as_str())?.to_string();

        let source = payload
            .get(PAYLOAD_SOURCE_KEY)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        let page = payload
            .get(PAYLOAD_PAGE_KEY)
            .and_then(|v| v.as_integer())
            .and_then(|p| u32::try_from(p).ok());

        Some(Self { text, source, page })
    }
}
