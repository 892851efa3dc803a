//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (batch size, timeouts, pool limits, port)
//! - Check the upstream URL and metrics address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// Largest accepted client timeout ceiling: one day.
pub const MAX_TIMEOUT_CEILING_SECS: u64 = 86_400;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every semantic constraint and collect all violations.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "must be non-zero"));
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.url", e.to_string())),
    }
    if config.upstream.max_connections == 0 {
        errors.push(ValidationError::new("upstream.max_connections", "must be at least 1"));
    }

    let fanout = &config.fanout;
    if fanout.batch_size == 0 {
        errors.push(ValidationError::new("fanout.batch_size", "must be at least 1"));
    }
    if fanout.max_timeout_secs == 0 || fanout.max_timeout_secs > MAX_TIMEOUT_CEILING_SECS {
        errors.push(ValidationError::new(
            "fanout.max_timeout_secs",
            format!("must be within 1..={} s", MAX_TIMEOUT_CEILING_SECS),
        ));
    }
    if fanout.default_timeout_ms == 0 || fanout.default_timeout_ms > fanout.max_timeout_ms() {
        errors.push(ValidationError::new(
            "fanout.default_timeout_ms",
            format!("must be within 1..={} ms", fanout.max_timeout_ms()),
        ));
    }
    if fanout.probe_window_ms == 0 {
        errors.push(ValidationError::new("fanout.probe_window_ms", "must be non-zero"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = GatewayConfig::default();
        config.fanout.batch_size = 0;
        config.fanout.probe_window_ms = 0;
        config.upstream.url = "ftp://example.com/work".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["upstream.url", "fanout.batch_size", "fanout.probe_window_ms"]
        );
    }

    #[test]
    fn test_default_timeout_must_fit_under_ceiling() {
        let mut config = GatewayConfig::default();
        config.fanout.max_timeout_secs = 1;
        config.fanout.default_timeout_ms = 1_500;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "fanout.default_timeout_ms");
    }

    #[test]
    fn test_max_timeout_has_a_ceiling() {
        let mut config = GatewayConfig::default();
        config.fanout.max_timeout_secs = MAX_TIMEOUT_CEILING_SECS;
        assert!(validate_config(&config).is_ok());

        config.fanout.max_timeout_secs = MAX_TIMEOUT_CEILING_SECS + 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "fanout.max_timeout_secs");

        config.fanout.max_timeout_secs = u64::MAX;
        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .iter()
            .map(|e| e.field)
            .collect();
        assert!(fields.contains(&"fanout.max_timeout_secs"));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
