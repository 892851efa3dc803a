//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Upstream endpoint and connection pool limits.
    pub upstream: UpstreamConfig,

    /// Batch size and timeout policy.
    pub fanout: FanoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` form accepted by `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Upstream endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// URL fetched by every upstream call.
    pub url: String,

    /// Maximum concurrent connections to the upstream.
    pub max_connections: usize,

    /// Maximum idle keep-alive connections kept in the pool.
    pub max_idle_connections: usize,

    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_env_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://exponea-engineering-assignment.appspot.com/api/work".to_string(),
            max_connections: 200,
            max_idle_connections: 25,
            connect_timeout_ms: 5_000,
            use_env_proxy: true,
        }
    }
}

/// Fan-out batch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// How many upstream calls one request races.
    pub batch_size: usize,

    /// Timeout used when the client does not pass one, in milliseconds.
    pub default_timeout_ms: u64,

    /// Largest timeout a client may ask for, in seconds.
    pub max_timeout_secs: u64,

    /// How long the smart policy waits on its single probe call, in milliseconds.
    pub probe_window_ms: u64,
}

impl FanoutConfig {
    /// Largest client timeout in milliseconds.
    pub fn max_timeout_ms(&self) -> u64 {
        self.max_timeout_secs.saturating_mul(1000)
    }

    pub fn probe_window(&self) -> Duration {
        Duration::from_millis(self.probe_window_ms)
    }
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            default_timeout_ms: 1_000,
            max_timeout_secs: 60,
            probe_window_ms: 300,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "fanout_gateway=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}
