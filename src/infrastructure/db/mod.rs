//! Document storage capability: schema-less JSON documents keyed by a
//! string id, with point lookups and full scans.

pub mod pool;
pub mod postgres;

use crate::infrastructure::StorageResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A stored document. Always carries its own `id` field.
pub type Document = Map<String, Value>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, id: &str, document: &Document) -> StorageResult<()>;

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Document>>;

    /// Every document, ordered by id.
    async fn list_all(&self) -> StorageResult<Vec<Document>>;

    /// At most `limit` documents with an id greater than `cursor`, ordered by id.
    async fn list_after(&self, cursor: Option<&str>, limit: u32) -> StorageResult<Vec<Document>>;
}
