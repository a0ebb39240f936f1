/// Worker state definitions for tracking pool progress
///
/// A worker loops `Idle -> Fetching -> Parsing -> Saving -> Idle` until the
/// frontier is exhausted, then moves to `Terminated` and never leaves it.
use crate::RippleError;
use std::fmt;

/// Represents the current state of one pool worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting for the next URL from the frontier
    Idle,

    /// Fetching the current URL
    Fetching,

    /// Extracting links from the fetched body
    Parsing,

    /// Persisting the page summary
    Saving,

    /// The frontier signalled termination (or the run was cancelled)
    Terminated,
}

impl WorkerState {
    /// Returns true if this worker will never process another item
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Returns true if the worker currently holds an item
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Fetching | Self::Parsing | Self::Saving)
    }

    /// Checks whether `next` is a legal successor of this state
    ///
    /// A failed fetch or parse skips straight back to `Idle`, and a busy
    /// worker may be cut short by cancellation.
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        use WorkerState::*;
        match (self, next) {
            (Idle, Fetching) | (Idle, Terminated) => true,
            (Fetching, Parsing) | (Fetching, Idle) => true,
            (Parsing, Saving) | (Parsing, Idle) => true,
            (Saving, Idle) => true,
            (Fetching | Parsing | Saving, Terminated) => true,
            _ => false,
        }
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn transition(self, next: WorkerState) -> Result<WorkerState, RippleError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(RippleError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Saving => "saving",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
