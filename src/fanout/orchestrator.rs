//! Fan-out race orchestrator.
//!
//! # Policies
//! ```text
//! ALL             spawn N → wait all or deadline → any pending or nothing decoded ⇒ error
//! FIRST           spawn N → wait first decoded success or deadline → none ⇒ error
//! WITHIN_TIMEOUT  spawn N → wait all or deadline → whatever decoded (maybe [])
//! SMART           spawn 1 → wait probe window for a decoded success
//!                 miss   → spawn N-1, keep the probe if still running,
//!                          FIRST rule against the batch deadline
//! ```
//!
//! Every path ends by cancelling whatever is still pending.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::fanout::outcome::{BatchError, Outcome};
use crate::fanout::policy::Policy;
use crate::fanout::task_set::TaskSet;
use crate::observability::metrics;
use crate::upstream::{TimeValue, UpstreamCaller};

/// How long the smart policy waits on its probe before widening the race.
pub const DEFAULT_PROBE_WINDOW: Duration = Duration::from_millis(300);

/// Runs batches of concurrent upstream calls against one shared caller.
pub struct Orchestrator {
    caller: Arc<dyn UpstreamCaller>,
    probe_window: Duration,
}

impl Orchestrator {
    pub fn new(caller: Arc<dyn UpstreamCaller>) -> Self {
        Self {
            caller,
            probe_window: DEFAULT_PROBE_WINDOW,
        }
    }

    pub fn with_probe_window(mut self, probe_window: Duration) -> Self {
        self.probe_window = probe_window;
        self
    }

    /// Race `size` upstream calls under `deadline` and reduce them per `policy`.
    ///
    /// `deadline` must already be validated by the caller. A `size` of zero is
    /// treated as one.
    pub async fn run(
        &self,
        policy: Policy,
        size: usize,
        deadline: Duration,
    ) -> Result<Outcome, BatchError> {
        let size = size.max(1);
        let batch_id = Uuid::new_v4();
        let started = Instant::now();
        let until = started + deadline;
        let mut tasks = TaskSet::new(batch_id, Arc::clone(&self.caller), deadline);

        tracing::debug!(
            batch_id = %batch_id,
            policy = %policy,
            size,
            deadline_ms = deadline.as_millis() as u64,
            "Batch started"
        );

        let result = match policy {
            Policy::All => all(&mut tasks, size, until).await,
            Policy::First => first(&mut tasks, size, until).await,
            Policy::WithinTimeout => within_timeout(&mut tasks, size, until).await,
            Policy::Smart => self.smart(&mut tasks, size, started, until).await,
        };

        let cancelled = tasks.cancel_pending();
        let done = tasks.done();
        tracing::info!(
            batch_id = %batch_id,
            policy = %policy,
            launched = tasks.launched(),
            done,
            cancelled,
            ok = result.is_ok(),
            "{} tasks done, {} cancelled",
            done,
            cancelled
        );
        if let Err(e) = &result {
            tracing::warn!(batch_id = %batch_id, policy = %policy, error = %e, "Batch failed");
        }
        metrics::record_batch(
            policy.slug(),
            if result.is_ok() { "ok" } else { "error" },
            started.elapsed(),
        );

        result
    }

    async fn smart(
        &self,
        tasks: &mut TaskSet,
        size: usize,
        started: Instant,
        until: Instant,
    ) -> Result<Outcome, BatchError> {
        tasks.spawn();
        let probe_until = (started + self.probe_window).min(until);
        if let Some(value) = first_success(tasks, probe_until).await {
            tracing::debug!(time = value.time, "Probe answered within window");
            return Ok(Outcome::Single(value));
        }

        if Instant::now() >= until {
            return Err(BatchError::NoResult);
        }

        tracing::debug!(
            probe_pending = tasks.pending() > 0,
            widen_by = size - 1,
            "Probe missed, widening race"
        );
        tasks.spawn_many(size - 1);

        first_success(tasks, until)
            .await
            .map(Outcome::Single)
            .ok_or(BatchError::NoResult)
    }
}

async fn all(tasks: &mut TaskSet, size: usize, until: Instant) -> Result<Outcome, BatchError> {
    tasks.spawn_many(size);
    let values = collect(tasks, until).await;

    let pending = tasks.pending();
    if pending > 0 {
        return Err(BatchError::Incomplete {
            launched: tasks.launched(),
            pending,
        });
    }
    if values.is_empty() {
        return Err(BatchError::NoResult);
    }
    Ok(Outcome::Many(values))
}

async fn first(tasks: &mut TaskSet, size: usize, until: Instant) -> Result<Outcome, BatchError> {
    tasks.spawn_many(size);
    first_success(tasks, until)
        .await
        .map(Outcome::Single)
        .ok_or(BatchError::NoResult)
}

async fn within_timeout(
    tasks: &mut TaskSet,
    size: usize,
    until: Instant,
) -> Result<Outcome, BatchError> {
    tasks.spawn_many(size);
    Ok(Outcome::Many(collect(tasks, until).await))
}

/// Every decoded value that arrives before `until`.
async fn collect(tasks: &mut TaskSet, until: Instant) -> Vec<TimeValue> {
    let mut values = Vec::new();
    while let Some(completion) = tasks.next_before(until).await {
        if let Ok(value) = completion.result {
            values.push(value);
        }
    }
    values
}

/// First value to complete and decode before `until`, in completion order.
async fn first_success(tasks: &mut TaskSet, until: Instant) -> Option<TimeValue> {
    while let Some(completion) = tasks.next_before(until).await {
        if let Ok(value) = completion.result {
            return Some(value);
        }
    }
    None
}
