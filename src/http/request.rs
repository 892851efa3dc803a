//! Request handling.
//!
//! # Responsibilities
//! - Read the request ID set by the tower-http layer
//! - Extract and validate the client-supplied timeout
//!
//! # Design Decisions
//! - An invalid timeout is rejected before any upstream work begins
//! - Unparseable and out-of-range timeouts get the same client error

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::HeaderMap;
use serde::Deserialize;
use std::time::Duration;

use crate::config::FanoutConfig;
use crate::http::response::ApiError;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation id of the request, or `"unknown"` when absent.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Query string accepted by every race endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TimeoutParams {
    /// Milliseconds.
    pub timeout: Option<i64>,
}

/// Turn the query into a batch deadline, enforcing `0 < timeout <= max`.
pub fn resolve_timeout(
    params: Result<Query<TimeoutParams>, QueryRejection>,
    config: &FanoutConfig,
) -> Result<Duration, ApiError> {
    let invalid = ApiError::InvalidTimeout {
        max_ms: config.max_timeout_ms(),
    };

    let Query(params) = params.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unparseable timeout parameter");
        invalid.clone()
    })?;

    let requested = match params.timeout {
        None => config.default_timeout_ms,
        Some(ms) => u64::try_from(ms).map_err(|_| invalid.clone())?,
    };

    if requested == 0 || requested > config.max_timeout_ms() {
        return Err(invalid);
    }
    Ok(Duration::from_millis(requested))
}
