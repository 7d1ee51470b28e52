//! Error handling for API endpoints

use axum::{http::StatusCode, response::IntoResponse, Json};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(err) => {
                // Log the full error details for debugging
                tracing::error!("Internal server error: {err:?}");
                // Return a generic message to the client to avoid information disclosure
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<gav_core::error::Error> for ApiError {
    fn from(err: gav_core::error::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}
