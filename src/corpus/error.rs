use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by corpus store operations.
pub enum CorpusError {
    /// Could not connect to the Qdrant endpoint.
    #[error("failed to connect to Qdrant at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Collection does not exist (the corpus was never ingested).
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name.
        collection: String,
    },

    /// Nearest-neighbor search failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Full-corpus scroll failed.
    #[error("failed to scroll '{collection}': {message}")]
    ScrollFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Query vector does not match the collection's dimension.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },
}
