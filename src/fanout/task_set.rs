//! Task bookkeeping for one batch.
//!
//! # Responsibilities
//! - Spawn upstream calls onto a private `JoinSet`
//! - Hand back completions in the order they actually finish, bounded by an instant
//! - Decode each completed body and record the task's terminal state
//! - Abort everything still running and mark it cancelled
//!
//! # Design Decisions
//! - Completions are only observed through `next_before`; nothing is inspected early
//! - Cancellation aborts the tokio task and never waits for it
//! - A panicking caller counts as an unreachable upstream, not a lost task

use futures_util::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use uuid::Uuid;

use crate::observability::metrics;
use crate::upstream::{decode, FailureKind, RawBody, TimeValue, UpstreamCaller};

/// Opaque task identity inside a batch. Never used for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of one upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Succeeded(TimeValue),
    Failed(FailureKind),
    Cancelled,
}

/// A task that just reached a terminal state, already decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub id: TaskId,
    pub result: Result<TimeValue, FailureKind>,
}

/// The set of upstream calls owned by one batch.
pub struct TaskSet {
    batch_id: Uuid,
    caller: Arc<dyn UpstreamCaller>,
    call_timeout: Duration,
    running: JoinSet<(TaskId, Result<RawBody, FailureKind>)>,
    states: Vec<TaskState>,
}

impl TaskSet {
    pub fn new(batch_id: Uuid, caller: Arc<dyn UpstreamCaller>, call_timeout: Duration) -> Self {
        Self {
            batch_id,
            caller,
            call_timeout,
            running: JoinSet::new(),
            states: Vec::new(),
        }
    }

    /// Launch one upstream call.
    pub fn spawn(&mut self) -> TaskId {
        let id = TaskId(self.states.len());
        self.states.push(TaskState::Pending);

        let caller = Arc::clone(&self.caller);
        let timeout = self.call_timeout;
        self.running.spawn(async move {
            let result = AssertUnwindSafe(caller.call(timeout))
                .catch_unwind()
                .await
                .unwrap_or(Err(FailureKind::UpstreamUnreachable));
            (id, result)
        });

        tracing::trace!(batch_id = %self.batch_id, task = %id, "Upstream call launched");
        id
    }

    /// Launch `count` upstream calls at once.
    pub fn spawn_many(&mut self, count: usize) {
        for _ in 0..count {
            self.spawn();
        }
    }

    /// Wait for the next task to finish, but not past `until`.
    ///
    /// Returns `None` when the instant passes or nothing is left running.
    pub async fn next_before(&mut self, until: Instant) -> Option<Completion> {
        loop {
            let joined = match time::timeout_at(until, self.running.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) | Err(_) => return None,
            };

            let (id, raw) = match joined {
                Ok(finished) => finished,
                Err(e) => {
                    // Only reachable after an abort; the state is already Cancelled.
                    tracing::debug!(batch_id = %self.batch_id, error = %e, "Ignoring aborted upstream task");
                    continue;
                }
            };

            let result = raw.and_then(|body| decode(&body));
            self.record(id, &result);
            return Some(Completion { id, result });
        }
    }

    /// Abort every task still running and mark it cancelled.
    ///
    /// Returns how many tasks were cancelled.
    pub fn cancel_pending(&mut self) -> usize {
        self.running.abort_all();

        let mut cancelled = 0;
        for idx in 0..self.states.len() {
            if self.states[idx] != TaskState::Pending {
                continue;
            }
            self.states[idx] = TaskState::Cancelled;
            cancelled += 1;
            metrics::record_upstream_call("cancelled");
            tracing::debug!(
                batch_id = %self.batch_id,
                task = %TaskId(idx),
                done = self.done(),
                pending = self.pending(),
                "Upstream call cancelled"
            );
        }
        cancelled
    }

    /// Tasks that finished (succeeded or failed).
    pub fn done(&self) -> usize {
        self.states
            .iter()
            .filter(|s| matches!(s, TaskState::Succeeded(_) | TaskState::Failed(_)))
            .count()
    }

    /// Tasks still running.
    pub fn pending(&self) -> usize {
        self.states.iter().filter(|s| **s == TaskState::Pending).count()
    }

    /// Tasks launched so far.
    pub fn launched(&self) -> usize {
        self.states.len()
    }

    fn record(&mut self, id: TaskId, result: &Result<TimeValue, FailureKind>) {
        self.states[id.0] = match result {
            Ok(value) => TaskState::Succeeded(*value),
            Err(kind) => TaskState::Failed(*kind),
        };

        let (done, pending) = (self.done(), self.pending());
        match result {
            Ok(value) => {
                metrics::record_upstream_call("success");
                tracing::debug!(
                    batch_id = %self.batch_id,
                    task = %id,
                    time = value.time,
                    done,
                    pending,
                    "Upstream call succeeded"
                );
            }
            Err(kind) => {
                metrics::record_upstream_call(kind.as_str());
                let message = if kind.is_transport() {
                    "Upstream API error"
                } else {
                    "Can't parse upstream response body"
                };
                tracing::warn!(
                    batch_id = %self.batch_id,
                    task = %id,
                    error = %kind,
                    done,
                    pending,
                    "{}",
                    message
                );
            }
        }
    }
}
