use thiserror::Error;

/// Failure reported by either store capability.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("stored document is not a valid record: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
