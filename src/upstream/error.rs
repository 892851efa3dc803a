//! Upstream failure classification.

use thiserror::Error;

/// Why a single upstream call produced no usable value.
///
/// Only ever logged and counted; it never reaches a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FailureKind {
    /// Connection, transport or per-call timeout failure.
    #[error("problem with connection to upstream")]
    UpstreamUnreachable,

    /// Upstream answered with a non-2xx status.
    #[error("upstream returned a non-success status")]
    UpstreamBadStatus,

    /// Body is not valid JSON.
    #[error("response body is not valid JSON")]
    MalformedBody,

    /// Body is JSON but does not match `{time: integer}`.
    #[error("response body does not match the expected schema")]
    SchemaInvalid,
}

impl FailureKind {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UpstreamUnreachable => "upstream_unreachable",
            FailureKind::UpstreamBadStatus => "upstream_bad_status",
            FailureKind::MalformedBody => "malformed_body",
            FailureKind::SchemaInvalid => "schema_invalid",
        }
    }

    /// True for failures of the call itself, false for body decoding failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FailureKind::UpstreamUnreachable | FailureKind::UpstreamBadStatus
        )
    }
}

/// Errors raised while building the upstream client at startup.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Configured URL could not be parsed.
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    /// reqwest refused the client configuration.
    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
