//! Error types for the indexing layer.

use cindex_storage::StorageError;
use thiserror::Error;

/// Errors that can occur while maintaining the derived index
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Storage operation failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Primary-store scan failed
    #[error("Source error: {0}")]
    Source(String),

    /// JSON encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for IndexingError {
    fn from(err: serde_json::Error) -> Self {
        IndexingError::Serialization(err.to_string())
    }
}
