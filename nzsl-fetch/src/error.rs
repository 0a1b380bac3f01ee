//! HTTP error mapping for nzsl-fetch
//!
//! Every failure leaves the API as `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::FetchError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::MissingQuery => {
                ApiError::BadRequest("Query parameter \"q\" is required".to_string())
            }
            FetchError::NoMatch { .. } => {
                ApiError::NotFound("No matching entries found for the query".to_string())
            }
            FetchError::NoVideo { nzsl_id } => {
                ApiError::NotFound(format!("No video found for ID: {}", nzsl_id))
            }
            FetchError::Upstream { nzsl_id, .. } | FetchError::Download { nzsl_id, .. } => {
                ApiError::Internal(format!("Failed to download video for ID: {}", nzsl_id))
            }
            FetchError::Corpus(_) | FetchError::ScanAborted(_) => {
                ApiError::Internal("Failed to read sign corpus".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
