use crate::infrastructure::{StorageError, StorageResult};
use std::future::Future;
use std::time::Duration;

/// Runs a store call under `limit`; expiry becomes `StorageError::Timeout`.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, call: F) -> StorageResult<T>
where
    F: Future<Output = StorageResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(operation)),
    }
}
