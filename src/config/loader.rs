//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for environment variable {key}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests need not mutate process state.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("API_HOST") {
        config.listener.host = host;
    }
    if let Some(port) = parse_env(&lookup, "API_PORT")? {
        config.listener.port = port;
    }
    if let Some(url) = lookup("UPSTREAM_URL") {
        config.upstream.url = url;
    }
    if let Some(limit) = parse_env(&lookup, "REQUESTS_LIMIT")? {
        config.fanout.batch_size = limit;
    }
    if let Some(max) = parse_env(&lookup, "MAX_CONN")? {
        config.upstream.max_connections = max;
    }
    if let Some(idle) = parse_env(&lookup, "MAX_KEEP_ALIVE")? {
        config.upstream.max_idle_connections = idle;
    }
    if let Some(secs) = parse_env(&lookup, "MAX_TIMEOUT")? {
        config.fanout.max_timeout_secs = secs;
    }
    Ok(())
}

fn parse_env<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { key, value }),
    }
}
