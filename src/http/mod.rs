//! Request gateway subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace and timeout layers)
//!     → request.rs (request ID, timeout extraction and validation)
//!     → fanout orchestrator (policy per endpoint)
//!     → response.rs (outcome or error envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{TimeoutParams, X_REQUEST_ID};
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, GatewayServer};
