//! Events broadcast by the history poller.
//!
//! Subscribers receive these through a [`tokio::sync::broadcast`]
//! channel. Call [`PollerHandle::subscribe`](crate::poller::PollerHandle::subscribe)
//! to receive them.

use enhancer_core::job::JobRecord;

/// A state change in the history poller.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A fetch cycle committed a fresh list.
    CycleCompleted {
        seq: u64,
        /// Number of records in the merged list.
        records: usize,
        /// Sum of the per-kind totals reported by the service.
        total: u64,
    },

    /// A fetch cycle failed; the previous list is still displayed.
    CycleFailed {
        seq: u64,
        /// Human-readable error description.
        error: String,
    },

    /// A fetch cycle was superseded before it could commit.
    CycleDiscarded { seq: u64 },

    /// At least one displayed job is active; periodic refresh is armed.
    PollingStarted,

    /// No displayed job is active; periodic refresh is disarmed.
    PollingStopped,

    /// A job seen active in the previous cycle is now terminal.
    JobFinished { record: JobRecord },
}
