//! Fan-out gateway library.
//!
//! Races several concurrent calls to one slow, unreliable upstream endpoint
//! and answers each client request according to a completion policy
//! (all, first, within-timeout, smart).

pub mod config;
pub mod fanout;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::GatewayConfig;
pub use fanout::{Orchestrator, Outcome, Policy};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
