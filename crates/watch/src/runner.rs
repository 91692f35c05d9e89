//! The watch loop: follows sync events until idle or cancelled.

use std::path::Path;
use std::sync::Arc;

use enhancer_client::source::JobSource;
use enhancer_core::format::format_dimensions;
use enhancer_core::job::JobRecord;
use enhancer_core::naming::ArtifactVariant;
use enhancer_sync::events::SyncEvent;
use enhancer_sync::poller::{PollerHandle, SyncConfig};
use enhancer_sync::retrieval::ArtifactRetriever;
use enhancer_sync::state::{HistorySnapshot, PollState};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::WatchConfig;

/// Follow the job history until cancelled, or until idle when
/// `exit_when_idle` is set.
pub async fn watch(source: Arc<dyn JobSource>, config: &WatchConfig, cancel: &CancellationToken) {
    let sync_config = SyncConfig {
        poll_interval: config.poll_interval,
        filter: config.filter,
        pages: config.pages,
        ..SyncConfig::default()
    };
    let handle = PollerHandle::spawn(Arc::clone(&source), sync_config, cancel);
    let retriever = ArtifactRetriever::new(source);
    let mut events = handle.subscribe();
    let mut snapshots = handle.watch();
    let download_dir = config.download_dir.as_deref();
    // Failed cycles are not retried by the poller while nothing is active.
    let mut retry_at: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    if matches!(event, SyncEvent::CycleFailed { .. })
                        && handle.snapshot().poll_state == PollState::Idle
                    {
                        retry_at = Some(Instant::now() + config.poll_interval);
                    }
                    on_event(&handle, &retriever, event, download_dir).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Watcher fell behind sync events");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::time::sleep_until(retry_at.unwrap_or_else(Instant::now)), if retry_at.is_some() => {
                retry_at = None;
                tracing::info!("Retrying history refresh");
                if handle.refresh().await.is_err() {
                    break;
                }
            }
            changed = snapshots.changed(), if config.exit_when_idle => {
                if changed.is_err() {
                    break;
                }
                let settled = is_settled(&snapshots.borrow_and_update());
                if settled {
                    // Finish events published alongside the final snapshot.
                    while let Ok(event) = events.try_recv() {
                        on_event(&handle, &retriever, event, download_dir).await;
                    }
                    tracing::info!("No active jobs left, exiting");
                    break;
                }
            }
        }
    }

    handle.shutdown().await;
}

/// A committed, error-free view with nothing left to poll.
pub fn is_settled(snapshot: &HistorySnapshot) -> bool {
    snapshot.committed_seq > 0
        && !snapshot.loading
        && snapshot.error.is_none()
        && snapshot.poll_state == PollState::Idle
}

async fn on_event(
    handle: &PollerHandle,
    retriever: &ArtifactRetriever,
    event: SyncEvent,
    download_dir: Option<&Path>,
) {
    match event {
        SyncEvent::CycleCompleted { .. } => log_active_jobs(&handle.snapshot()),
        SyncEvent::CycleFailed { seq, error } => {
            tracing::warn!(seq, error = %error, "History refresh failed, retrying on next cycle");
        }
        SyncEvent::JobFinished { record } => {
            log_finished(&record);
            if let Some(dir) = download_dir {
                download(retriever, &record, dir).await;
            }
        }
        SyncEvent::PollingStarted | SyncEvent::PollingStopped | SyncEvent::CycleDiscarded { .. } => {}
    }
}

fn log_active_jobs(snapshot: &HistorySnapshot) {
    let active: Vec<&JobRecord> = snapshot.records.iter().filter(|r| r.is_active()).collect();
    tracing::info!(
        shown = snapshot.records.len(),
        total = snapshot.total,
        active = active.len(),
        "History refreshed",
    );
    for record in active {
        tracing::info!(
            job = %record.key(),
            name = %record.original_name(),
            status = %record.status(),
            progress = ?record.progress_percent(),
            "Job in progress",
        );
    }
}

fn log_finished(record: &JobRecord) {
    if record.status().is_completed() {
        tracing::info!(
            job = %record.key(),
            name = %record.original_name(),
            model = %record.model_display_name(),
            output = %format_dimensions(record.enhanced_dimensions()),
            "Job completed",
        );
    } else {
        tracing::warn!(
            job = %record.key(),
            name = %record.original_name(),
            status = %record.status(),
            error = record.error_message().unwrap_or("-"),
            "Job did not complete",
        );
    }
}

async fn download(retriever: &ArtifactRetriever, record: &JobRecord, dir: &Path) {
    if !record.status().is_completed() {
        return;
    }
    let artifact = match retriever.retrieve(record, ArtifactVariant::Enhanced).await {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::error!(job = %record.key(), error = %e, "Could not retrieve enhanced file");
            return;
        }
    };
    if let Err(e) = artifact.save_to(dir).await {
        tracing::error!(
            job = %record.key(),
            dir = %dir.display(),
            error = %e,
            "Could not save enhanced file",
        );
    }
}
