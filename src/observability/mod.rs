//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator, task set, gateway handlers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Batch and task ids flow through every log line of a batch
//! - Request ID set and propagated by tower-http
//! - Task failure detail only ever appears here, never in responses

pub mod logging;
pub mod metrics;
