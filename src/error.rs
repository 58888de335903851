use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::captioner::CaptionError;
use crate::translator::TranslationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("a Hugging Face API key is required")]
    MissingApiKey,
    #[error("the captioning service rejected the API key")]
    InvalidApiKey,
    #[error("no image file was uploaded")]
    MissingFile,
    #[error("no text was provided")]
    MissingText,
    #[error("malformed upload: {0}")]
    MalformedUpload(String),
    #[error("unsupported file type {0}; upload a .jpg, .jpeg or .png image")]
    UnsupportedMediaType(String),
    #[error("file is not a valid image: {0}")]
    InvalidImage(String),
    #[error("file exceeds the {limit} byte upload limit")]
    PayloadTooLarge { limit: usize },
    #[error("upstream service failed: {0}")]
    Upstream(String),
    #[error("something went wrong: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingApiKey | AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AppError::MissingFile
            | AppError::MissingText
            | AppError::MalformedUpload(_)
            | AppError::UnsupportedMediaType(_)
            | AppError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<CaptionError> for AppError {
    fn from(err: CaptionError) -> Self {
        match err {
            CaptionError::Unauthorized => AppError::InvalidApiKey,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<TranslationError> for AppError {
    fn from(err: TranslationError) -> Self {
        AppError::Upstream(err.to_string())
    }
}
