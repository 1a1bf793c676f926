//! Worker lifecycle state
//!
//! The worker moves through exactly two states: `Installing` until the
//! precache batch has been committed (or resumed from a previous run),
//! then `Ready`. Request resolution is gated on `Ready`, making the
//! install-before-serve ordering explicit instead of relying on an
//! external scheduler's guarantee.

use std::fmt;

/// Lifecycle state of the offline worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Initial state; the precache batch has not been committed yet
    Installing,
    /// The versioned store is populated and requests can be served
    Ready,
}

impl WorkerState {
    /// Returns true if the worker may resolve requests in this state
    pub fn can_resolve(&self) -> bool {
        matches!(self, WorkerState::Ready)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Ready => write!(f, "ready"),
        }
    }
}
