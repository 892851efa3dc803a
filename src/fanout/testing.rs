//! Scripted upstream used by unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::upstream::{FailureKind, RawBody, UpstreamCaller};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Reply {
    Body(&'static str),
    Fail(FailureKind),
    Hang,
}

/// What the n-th call does.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    pub delay: Duration,
    pub reply: Reply,
}

pub(crate) fn ok(delay_ms: u64, body: &'static str) -> Step {
    Step {
        delay: Duration::from_millis(delay_ms),
        reply: Reply::Body(body),
    }
}

pub(crate) fn fail(delay_ms: u64, kind: FailureKind) -> Step {
    Step {
        delay: Duration::from_millis(delay_ms),
        reply: Reply::Fail(kind),
    }
}

pub(crate) fn hang() -> Step {
    Step {
        delay: Duration::ZERO,
        reply: Reply::Hang,
    }
}

/// Replays `steps` by call order, cycling when calls outnumber steps.
pub(crate) struct ScriptedUpstream {
    steps: Vec<Step>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    timeouts: Mutex<Vec<Duration>>,
}

impl ScriptedUpstream {
    pub(crate) fn new(steps: Vec<Step>) -> Arc<Self> {
        assert!(!steps.is_empty(), "script needs at least one step");
        Arc::new(Self {
            steps,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            timeouts: Mutex::new(Vec::new()),
        })
    }

    /// Calls started so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Per-call timeout each call was started with, in call order.
    pub(crate) fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }

    /// Calls started but neither finished nor dropped.
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UpstreamCaller for ScriptedUpstream {
    async fn call(&self, timeout: Duration) -> Result<RawBody, FailureKind> {
        self.timeouts.lock().unwrap().push(timeout);
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps[index % self.steps.len()];
        let _guard = InFlightGuard::enter(&self.in_flight);

        let exchange = async move {
            tokio::time::sleep(step.delay).await;
            match step.reply {
                Reply::Body(body) => Ok(body.to_string()),
                Reply::Fail(kind) => Err(kind),
                Reply::Hang => std::future::pending().await,
            }
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .unwrap_or(Err(FailureKind::UpstreamUnreachable))
    }
}
