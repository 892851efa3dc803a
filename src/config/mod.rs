//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → loader.rs (optional TOML file, then environment overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to the server and orchestrator at startup
//! ```
//!
//! # Design Decisions
//! - Read once at process start; no hot reload
//! - All fields have defaults to allow an empty or missing config file
//! - Environment names match the deployment scripts (`API_HOST`, `MAX_TIMEOUT`, ...)
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::FanoutConfig;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::UpstreamConfig;
pub use validation::{validate_config, ValidationError};
