use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::intake::IntakeError;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::InvalidRequest(msg) => AppError::InvalidRequest(msg),
            other => {
                tracing::error!(error = %other, "Order intake failed");
                AppError::Internal(other.into())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // internal details stay in the logs
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
