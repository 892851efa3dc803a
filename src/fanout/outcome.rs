//! Batch results.

use serde::Serialize;
use thiserror::Error;

use crate::upstream::TimeValue;

/// What a successful batch hands back to the gateway.
///
/// Serializes to the wire shape directly: an object or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Single(TimeValue),
    Many(Vec<TimeValue>),
}

impl Outcome {
    /// Number of values carried.
    pub fn len(&self) -> usize {
        match self {
            Outcome::Single(_) => 1,
            Outcome::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Batch-level failure. Carries counts only; task failure detail stays in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Some calls were still running when the deadline passed.
    #[error("{pending} of {launched} upstream calls did not finish before the deadline")]
    Incomplete { launched: usize, pending: usize },

    /// No call produced a usable value.
    #[error("no upstream call produced a usable value")]
    NoResult,
}
