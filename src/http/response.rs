//! Response mapping.
//!
//! # Responsibilities
//! - Serialize batch outcomes in the policy's shape (object or array)
//! - Map gateway and batch errors to status codes with a `{"detail": ...}` body
//!
//! # Design Decisions
//! - Batch failures collapse to one generic 500; task detail never leaves the logs
//! - Invalid client input is a 400 raised before any upstream work

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fanout::BatchError;

/// Error envelope returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Errors a gateway endpoint can answer with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Invalid timeout - maximum is {max_ms} ms")]
    InvalidTimeout { max_ms: u64 },

    #[error("Internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidTimeout { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BatchError> for ApiError {
    fn from(_: BatchError) -> Self {
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
