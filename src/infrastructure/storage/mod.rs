//! Blob storage capability.
//!
//! Objects live in named containers (buckets) and are addressed by
//! `(container, name)`. Containers are created on demand.

pub mod multipart;
pub mod s3;

use crate::infrastructure::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;

/// Body of an upload, consumed chunk by chunk.
pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send + 'a>>;

/// Access policy a container must carry.
///
/// `PublicRead` lets anyone list the container and read its objects, so the
/// URIs returned by uploads can be embedded directly by clients. It is the
/// only policy uploads use; a private variant belongs here once some file
/// type has to stay unlisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAccess {
    PublicRead,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn container_exists(&self, container: &str) -> StorageResult<bool>;

    /// Creates the container with the given policy. Must succeed when the
    /// container already exists, since two first uploads can race here.
    async fn create_container(&self, container: &str, access: ContainerAccess) -> StorageResult<()>;

    /// Streams `body` into `container/name`, replacing any existing object,
    /// and returns the object's URI.
    async fn upload_stream(
        &self,
        container: &str,
        name: &str,
        content_type: &str,
        body: ByteStream<'_>,
    ) -> StorageResult<String>;

    /// Returns `true` when the container had to be created.
    ///
    /// Stores whose creation is not atomic override this so a container left
    /// behind by a half-finished creation still ends up with `access`.
    async fn ensure_container(&self, container: &str, access: ContainerAccess) -> StorageResult<bool> {
        if self.container_exists(container).await? {
            return Ok(false);
        }
        self.create_container(container, access).await?;
        Ok(true)
    }
}
