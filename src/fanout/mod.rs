//! Fan-out race subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator::run(policy, size, deadline)
//!     → task_set.rs (spawn N upstream calls on a JoinSet)
//!     → policy stopping rule: next completion before the deadline / probe window
//!     → each completion decoded in completion order
//!     → cancel whatever is still pending (abort, never awaited)
//!     → reduce decoded values into an Outcome or a BatchError
//! ```
//!
//! # Design Decisions
//! - A batch owns its task set; nothing is shared between batches
//! - The per-call timeout equals the batch deadline; waiting is the real governor
//! - Task-level failures are logged and excluded, never propagated
//! - Every task is terminal (Succeeded, Failed or Cancelled) when `run` returns

pub mod orchestrator;
pub mod outcome;
pub mod policy;
pub mod task_set;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{Orchestrator, DEFAULT_PROBE_WINDOW};
pub use outcome::{BatchError, Outcome};
pub use policy::Policy;
pub use task_set::{Completion, TaskId, TaskSet, TaskState};
