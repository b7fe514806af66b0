use crate::infrastructure::storage::s3::S3BlobStore;
use crate::infrastructure::storage::ByteStream;
use crate::infrastructure::StorageResult;
use aws_sdk_s3::types::CompletedPart;
use bytes::Bytes;
use futures_util::StreamExt;
use tracing::{debug, error, warn};

// Every part but the last must be at least 5 MiB.
const PART_SIZE: usize = 6 * 1024 * 1024;

/// One S3 multipart upload, fed from a [`ByteStream`].
///
/// The upload either completes or is aborted: [`MultipartUploader::upload`]
/// aborts on any failure, including a failed final part or completion
/// request, so no parts are left behind in the bucket.
pub struct MultipartUploader<'a> {
    store: &'a S3BlobStore,
    bucket: &'a str,
    key: &'a str,
    upload_id: String,
    parts: Vec<CompletedPart>,
    buffer: Vec<u8>,
}

impl<'a> MultipartUploader<'a> {
    pub async fn new(
        store: &'a S3BlobStore,
        bucket: &'a str,
        key: &'a str,
        content_type: &str,
    ) -> StorageResult<Self> {
        let upload_id = store.create_multipart_upload(bucket, key, content_type).await?;
        debug!(bucket, key, upload_id = %upload_id, "Multipart upload started");

        Ok(Self {
            store,
            bucket,
            key,
            upload_id,
            parts: Vec::new(),
            buffer: Vec::with_capacity(PART_SIZE),
        })
    }

    pub async fn upload(mut self, mut body: ByteStream<'_>) -> StorageResult<()> {
        match self.drain(&mut body).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(bucket = self.bucket, key = self.key, error = %e, "Upload failed, aborting");
                if let Err(abort_err) = self.abort().await {
                    warn!(
                        bucket = self.bucket,
                        key = self.key,
                        upload_id = %self.upload_id,
                        error = %abort_err,
                        "Failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn drain(&mut self, body: &mut ByteStream<'_>) -> StorageResult<()> {
        while let Some(chunk) = body.next().await {
            self.buffer.extend_from_slice(&chunk?);
            if self.buffer.len() >= PART_SIZE {
                self.flush_part().await?;
            }
        }

        // The last part may be short.
        self.flush_part().await?;

        let parts = std::mem::take(&mut self.parts);
        self.store
            .complete_multipart_upload(self.bucket, self.key, &self.upload_id, parts)
            .await
    }

    async fn flush_part(&mut self) -> StorageResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let body = Bytes::from(std::mem::replace(&mut self.buffer, Vec::with_capacity(PART_SIZE)));
        let part_number = self.parts.len() as i32 + 1;

        let part = self
            .store
            .upload_part(self.bucket, self.key, &self.upload_id, part_number, body)
            .await?;
        self.parts.push(part);

        Ok(())
    }

    async fn abort(&self) -> StorageResult<()> {
        self.store
            .abort_multipart_upload(self.bucket, self.key, &self.upload_id)
            .await
    }
}
