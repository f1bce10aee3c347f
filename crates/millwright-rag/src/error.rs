//! Retrieval layer errors

use thiserror::Error;

/// Result type for retrieval operations
pub type RagResult<T> = std::result::Result<T, RagError>;

/// Retrieval layer errors
#[derive(Error, Debug)]
pub enum RagError {
    /// Collection has not been created
    #[error("unknown collection: {name}")]
    CollectionNotFound { name: String },

    /// Embedding generation failed
    #[error("embedding failed: {reason}")]
    EmbeddingFailed { reason: String },

    /// Document ingestion failed
    #[error("document ingestion failed for '{path}': {reason}")]
    IngestionFailed { path: String, reason: String },
}

impl RagError {
    /// Create an ingestion error
    pub fn ingestion(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IngestionFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
