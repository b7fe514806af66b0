use super::dto::UploadResponse;
use crate::common::error::AppError;
use crate::common::timeout::bounded;
use crate::infrastructure::storage::{ByteStream, ContainerAccess};
use crate::infrastructure::StorageError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::multipart::{Field, Multipart, MultipartRejection};
use futures_util::{stream, StreamExt};
use tracing::{info, warn};

pub const FILE_FIELD: &str = "file";
const FILE_TYPE_REQUIRED: &str = "The file-type header is mandatory";
const FILE_REQUIRED: &str = "The file was not sent or is empty";
const STORE_FAILED: &str = "Failed to store the file";

pub struct UploadService;

impl UploadService {
    /// Validates the request, makes sure the container named by `file_type`
    /// exists (public read), then streams the `file` part into it under its
    /// own file name, overwriting any previous object.
    pub async fn store(
        state: AppState,
        file_type: Option<&str>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<UploadResponse, AppError> {
        let Some(container) = file_type.map(str::trim).filter(|v| !v.is_empty()) else {
            warn!("Upload without file-type header");
            return Err(AppError::validation(FILE_TYPE_REQUIRED));
        };

        let mut multipart = multipart.map_err(|e| {
            warn!(error = %e, "Upload body is not a multipart form");
            AppError::validation(FILE_REQUIRED)
        })?;

        // Other form fields are skipped until the `file` part.
        let mut field = loop {
            match multipart.next_field().await {
                Ok(Some(field)) if field.name() == Some(FILE_FIELD) => break field,
                Ok(Some(_)) => continue,
                Ok(None) => {
                    warn!("Upload without a file part");
                    return Err(AppError::validation(FILE_REQUIRED));
                }
                Err(e) => {
                    warn!(error = %e, "Malformed multipart body");
                    return Err(AppError::validation(FILE_REQUIRED));
                }
            }
        };

        let Some(file_name) = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            warn!("File part has no file name");
            return Err(AppError::validation(FILE_REQUIRED));
        };

        // Generic binary parts are typed from the file name instead.
        let content_type = field
            .content_type()
            .filter(|ct| *ct != mime::APPLICATION_OCTET_STREAM.essence_str())
            .map(str::to_owned)
            .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream().to_string());

        // Reading ahead keeps an empty file from creating a container.
        let first = first_chunk(&mut field).await?;

        let created = bounded(
            state.config.store_timeout,
            "ensure container",
            state.blobs.ensure_container(container, ContainerAccess::PublicRead),
        )
        .await
        .map_err(AppError::storage(STORE_FAILED))?;

        if created {
            info!(container, "Container created with public read access");
        }

        let rest = field.map(|chunk| {
            chunk.map_err(|e| StorageError::Backend(format!("upload stream interrupted: {e}")))
        });
        let body: ByteStream<'_> = Box::pin(stream::once(async move { Ok::<_, StorageError>(first) }).chain(rest));

        let blob_uri = state
            .blobs
            .upload_stream(container, &file_name, &content_type, body)
            .await
            .map_err(AppError::storage(STORE_FAILED))?;

        info!(container, file = %file_name, uri = %blob_uri, "File stored");

        Ok(UploadResponse {
            message: format!("File {file_name} stored successfully"),
            blob_uri,
        })
    }
}

async fn first_chunk(field: &mut Field<'_>) -> Result<Bytes, AppError> {
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) if chunk.is_empty() => continue,
            Ok(Some(chunk)) => return Ok(chunk),
            Ok(None) => {
                warn!("Uploaded file is empty");
                return Err(AppError::validation(FILE_REQUIRED));
            }
            Err(e) => {
                warn!(error = %e, "Malformed multipart body");
                return Err(AppError::validation(FILE_REQUIRED));
            }
        }
    }
}
