//! Completion policies.

use std::fmt;

/// How a batch decides when to stop waiting and what to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Wait for every call; any shortfall is an error.
    All,
    /// Return the first call that succeeds and decodes.
    First,
    /// Return whatever decoded before the deadline, possibly nothing.
    WithinTimeout,
    /// Probe with one call, widen to the full batch if it is slow or fails.
    Smart,
}

impl Policy {
    pub const ALL: [Policy; 4] = [Policy::All, Policy::First, Policy::WithinTimeout, Policy::Smart];

    /// URL segment and metrics label.
    pub fn slug(&self) -> &'static str {
        match self {
            Policy::All => "all",
            Policy::First => "first",
            Policy::WithinTimeout => "within-timeout",
            Policy::Smart => "smart",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
