//! Error types for the anchor API

use anchor_core::AnchorError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Pdf(#[from] AnchorError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Pdf(e @ AnchorError::MalformedDocument(_))
            | ApiError::Pdf(e @ AnchorError::InvalidResolution(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Pdf(e @ AnchorError::PageOutOfRange { .. }) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ApiError::Pdf(e) => {
                tracing::error!("Failed to process PDF: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to process PDF: {}", e),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
