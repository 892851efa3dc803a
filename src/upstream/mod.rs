//! Upstream access subsystem.
//!
//! # Data Flow
//! ```text
//! orchestrator task
//!     → caller.rs (one GET against the configured URL, bounded by a timeout)
//!     → raw body or FailureKind
//!     → decode.rs (JSON parse + `{time: integer}` schema check)
//!     → TimeValue or FailureKind
//! ```
//!
//! # Design Decisions
//! - One shared reqwest client (connection pool) per process
//! - Pool size bounded by a semaphore, idle connections by reqwest
//! - Every failure is classified into the closed `FailureKind` set
//! - Dropping a call future aborts the in-flight request

pub mod caller;
pub mod decode;
pub mod error;

pub use caller::{HttpUpstream, RawBody, UpstreamCaller};
pub use decode::{decode, TimeValue};
pub use error::{FailureKind, UpstreamError};
