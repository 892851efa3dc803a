//! Upstream HTTP caller.
//!
//! # Responsibilities
//! - Issue one GET against the configured upstream URL
//! - Bound the whole exchange (permit, connect, headers, body) by the caller's timeout
//! - Classify every failure into a `FailureKind`
//! - Share a single connection pool across all batches

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::UpstreamConfig;
use crate::upstream::error::{FailureKind, UpstreamError};

/// Undecoded upstream response body.
pub type RawBody = String;

/// One call to the upstream resource.
///
/// Implementations must be abortable by dropping the returned future.
#[async_trait]
pub trait UpstreamCaller: Send + Sync {
    async fn call(&self, timeout: Duration) -> Result<RawBody, FailureKind>;
}

/// reqwest-backed caller shared by every batch in the process.
pub struct HttpUpstream {
    client: reqwest::Client,
    url: Url,
    permits: Arc<Semaphore>,
}

impl HttpUpstream {
    /// Build the shared client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let url = Url::parse(&config.url)?;
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(config.max_idle_connections)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms));
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::info!(
            url = %url,
            max_connections = config.max_connections,
            max_idle_connections = config.max_idle_connections,
            "Upstream client initialized"
        );

        Ok(Self {
            client,
            url,
            permits: Arc::new(Semaphore::new(config.max_connections)),
        })
    }

    async fn exchange(&self) -> Result<RawBody, FailureKind> {
        // Held until the body is read; the pool never exceeds max_connections.
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FailureKind::UpstreamUnreachable)?;

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Problem with connection to upstream");
                FailureKind::UpstreamUnreachable
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Upstream returned wrong status code");
            return Err(FailureKind::UpstreamBadStatus);
        }

        response.text().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read upstream body");
            FailureKind::UpstreamUnreachable
        })
    }
}

#[async_trait]
impl UpstreamCaller for HttpUpstream {
    async fn call(&self, timeout: Duration) -> Result<RawBody, FailureKind> {
        match tokio::time::timeout(timeout, self.exchange()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Upstream call timed out");
                Err(FailureKind::UpstreamUnreachable)
            }
        }
    }
}
