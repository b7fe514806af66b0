use crate::common::response::ApiError;
use crate::infrastructure::StorageError;
use axum::http::StatusCode;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Required client input is missing.
    #[error("{0}")]
    Validation(String),

    /// Client input could not be parsed.
    #[error("{0}")]
    MalformedInput(String),

    #[error("{0}")]
    NotFound(String),

    /// `message` is what the caller sees; `source` is only logged.
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StorageError,
    },
}

impl AppError {
    pub fn validation(message: &str) -> Self {
        Self::Validation(message.to_string())
    }

    pub fn malformed(message: &str) -> Self {
        Self::MalformedInput(message.to_string())
    }

    /// For `map_err` at a store call site.
    pub fn storage(message: &'static str) -> impl FnOnce(StorageError) -> AppError {
        move |source| AppError::Storage { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = err.status();
        if let AppError::Storage { message, source } = &err {
            error!(error = %source, "{}", message);
        }
        ApiError(err.to_string(), status)
    }
}
