use enhancer_client::error::EnhanceApiError;
use enhancer_core::job::JobKind;

/// Errors from a fetch cycle or from talking to the poller task.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A list query failed. The whole cycle fails with it.
    #[error("Failed to list {kind} jobs: {source}")]
    Source {
        kind: JobKind,
        #[source]
        source: EnhanceApiError,
    },

    /// The poller task has exited and no longer accepts commands.
    #[error("History poller is not running")]
    Stopped,
}

impl SyncError {
    /// Whether a later cycle may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Source { source, .. } => source.is_retryable(),
            Self::Stopped => false,
        }
    }
}
