use super::dto::UploadResponse;
use super::service::UploadService;
use crate::common::response::{ApiError, ApiSuccess, ErrorBody};
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::info;

pub const FILE_TYPE_HEADER: &str = "file-type";

/// Upload a file
///
/// Streams the `file` part to blob storage. The `file-type` header names the
/// destination container, which is created with public read access on first
/// use. An existing object with the same file name is replaced.
#[utoipa::path(
    post,
    path = "/upload",
    params(
        ("file-type" = String, Header, description = "Destination container, e.g. `image` or `video`")
    ),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing header or file", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "Upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    info!("Processing file upload");

    let file_type = headers
        .get(FILE_TYPE_HEADER)
        .and_then(|value| value.to_str().ok());

    match UploadService::store(state, file_type, multipart).await {
        Ok(res) => ApiSuccess(res, StatusCode::OK).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
