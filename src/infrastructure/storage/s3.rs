use crate::config::settings::StorageSettings;
use crate::infrastructure::storage::multipart::MultipartUploader;
use crate::infrastructure::storage::{BlobStore, ByteStream, ContainerAccess};
use crate::infrastructure::{StorageError, StorageResult};
use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::types::{
    BucketLocationConstraint, CompletedMultipartUpload, CompletedPart, CreateBucketConfiguration,
};
use aws_sdk_s3::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const DEFAULT_REGION: &str = "us-east-1";

/// S3-compatible object storage (AWS, MinIO). One bucket per container.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    region: String,
    public_url: Url,
}

impl S3BlobStore {
    /// `attempt_timeout` bounds every individual S3 request, including each
    /// uploaded part. Retries are off: failures surface immediately.
    pub fn new(settings: &StorageSettings, attempt_timeout: Duration) -> Self {
        let credentials = Credentials::new(
            settings.access_key.as_str(),
            settings.secret_key.as_str(),
            None,
            None,
            "static",
        );

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .endpoint_url(settings.endpoint.as_str().trim_end_matches('/'))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_attempt_timeout(attempt_timeout)
                    .build(),
            )
            .build();

        info!(endpoint = %settings.endpoint, region = %settings.region, "S3 client configured");

        Self {
            client: Client::from_conf(config),
            region: settings.region.clone(),
            public_url: settings.public_url.clone(),
        }
    }

    pub async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let result = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| sdk_failure("create_multipart_upload", e))?;

        result
            .upload_id
            .ok_or_else(|| StorageError::Backend("create_multipart_upload: no upload id returned".to_string()))
    }

    pub async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: bytes::Bytes,
    ) -> StorageResult<CompletedPart> {
        let result = self
            .client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(aws_sdk_s3::primitives::ByteStream::from(body))
            .send()
            .await
            .map_err(|e| sdk_failure("upload_part", e))?;

        Ok(CompletedPart::builder()
            .set_e_tag(result.e_tag)
            .part_number(part_number)
            .build())
    }

    pub async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> StorageResult<()> {
        let completed_multipart_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed_multipart_upload)
            .send()
            .await
            .map_err(|e| sdk_failure("complete_multipart_upload", e))?;

        Ok(())
    }

    pub async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> StorageResult<()> {
        self.client
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| sdk_failure("abort_multipart_upload", e))?;

        Ok(())
    }

    async fn apply_public_read(&self, bucket: &str) -> StorageResult<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(public_read_policy(bucket))
            .send()
            .await
            .map_err(|e| sdk_failure("put_bucket_policy", e))?;

        info!(bucket, "Applied public read policy");
        Ok(())
    }

    async fn has_policy(&self, bucket: &str) -> StorageResult<bool> {
        match self.client.get_bucket_policy().bucket(bucket).send().await {
            Ok(output) => Ok(output.policy().is_some_and(|p| !p.is_empty())),
            Err(err) => {
                let missing = err.as_service_error().and_then(|e| e.code()) == Some("NoSuchBucketPolicy")
                    || err.raw_response().is_some_and(|r| r.status().as_u16() == 404);
                if missing {
                    Ok(false)
                } else {
                    Err(sdk_failure("get_bucket_policy", err))
                }
            }
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn container_exists(&self, container: &str) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(container).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let not_found = err.as_service_error().is_some_and(|e| e.is_not_found())
                    || err.raw_response().is_some_and(|r| r.status().as_u16() == 404);
                if not_found {
                    Ok(false)
                } else {
                    Err(sdk_failure("head_bucket", err))
                }
            }
        }
    }

    async fn create_container(&self, container: &str, access: ContainerAccess) -> StorageResult<()> {
        let mut request = self.client.create_bucket().bucket(container);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => info!(container, ?access, "Created container"),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_bucket_already_owned_by_you()) =>
            {
                debug!(container, "Container was created concurrently");
            }
            Err(err) => return Err(sdk_failure("create_bucket", err)),
        }

        match access {
            ContainerAccess::PublicRead => self.apply_public_read(container).await,
        }
    }

    /// Creating a bucket and attaching its policy are separate requests. An
    /// existing bucket is therefore checked for a policy too, and gets one if
    /// an earlier creation stopped in between.
    async fn ensure_container(&self, container: &str, access: ContainerAccess) -> StorageResult<bool> {
        if !self.container_exists(container).await? {
            self.create_container(container, access).await?;
            return Ok(true);
        }

        match access {
            ContainerAccess::PublicRead => {
                if !self.has_policy(container).await? {
                    warn!(container, "Existing container has no policy");
                    self.apply_public_read(container).await?;
                }
            }
        }

        Ok(false)
    }

    async fn upload_stream(
        &self,
        container: &str,
        name: &str,
        content_type: &str,
        body: ByteStream<'_>,
    ) -> StorageResult<String> {
        MultipartUploader::new(self, container, name, content_type)
            .await?
            .upload(body)
            .await?;

        Ok(blob_url(&self.public_url, container, name))
    }
}

/// `<base>/<container>/<name>`, each segment percent-encoded. Slashes in
/// `name` are kept as path separators.
pub fn blob_url(base: &Url, container: &str, name: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(container).extend(name.split('/'));
    }
    url.to_string()
}

/// Anonymous listing of the bucket and reading of every object in it.
pub fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "AWS": ["*"] },
                "Action": ["s3:GetBucketLocation", "s3:ListBucket"],
                "Resource": [format!("arn:aws:s3:::{bucket}")]
            },
            {
                "Effect": "Allow",
                "Principal": { "AWS": ["*"] },
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket}/*")]
            }
        ]
    })
    .to_string()
}

fn sdk_failure<E: std::error::Error>(operation: &str, err: E) -> StorageError {
    StorageError::Backend(format!("{operation}: {}", DisplayErrorContext(err)))
}
