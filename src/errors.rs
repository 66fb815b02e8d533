use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;
use tracing::error;

use crate::models::ValidationError;
use crate::scan::ScanError;
use crate::seed::SeedError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Cannot connect to Ollama service. Please ensure Ollama is running.")]
    AnalyzerUnavailable,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Unreadable request bodies are validation failures, so they carry the
/// usual error body instead of axum's plain-text 422
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::JobNotFound => ApiError::NotFound(err.to_string()),
            ScanError::OllamaUnavailable(_) => ApiError::AnalyzerUnavailable,
            other => ApiError::Database(anyhow::Error::new(other)),
        }
    }
}

impl From<SeedError> for ApiError {
    fn from(err: SeedError) -> Self {
        match err {
            SeedError::AdminMissing => ApiError::NotFound(err.to_string()),
            SeedError::Database(e) => ApiError::Database(e),
            other => ApiError::Database(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Request failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            err @ ApiError::AnalyzerUnavailable => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
