//! Polling controller for the history view.
//!
//! `HistoryPoller` owns a [`HistoryState`] inside one long-lived Tokio
//! task. The task runs a fetch cycle on start, on every command, and on a
//! fixed interval while any displayed job is active. At most one cycle is
//! in flight: a command arriving mid-cycle drops the in-flight future and
//! starts over, and the interval is only re-armed once a cycle finishes.
//!
//! Snapshots are published through a [`tokio::sync::watch`] channel and
//! state changes through a [`tokio::sync::broadcast`] channel. Both are
//! reachable from the [`PollerHandle`] returned by [`PollerHandle::spawn`].

use std::sync::Arc;
use std::time::Duration;

use enhancer_client::source::JobSource;
use enhancer_core::filter::{HistoryFilter, PAGE_SIZE};
use futures::future::BoxFuture;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::events::SyncEvent;
use crate::merge::merge;
use crate::planner::{fetch_cycle, KindFetch};
use crate::state::{CommitOutcome, CycleToken, HistorySnapshot, HistoryState, PollState};

/// Default interval between cycles while jobs are active.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Broadcast channel capacity for sync events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Command channel capacity.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// How long [`PollerHandle::shutdown`] waits for the task to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Poller settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub poll_interval: Duration,
    pub per_page: u32,
    /// Filter shown on start.
    pub filter: HistoryFilter,
    /// Pages per kind to load on start.
    pub pages: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            per_page: PAGE_SIZE,
            filter: HistoryFilter::default(),
            pages: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    SetFilter(HistoryFilter),
    LoadMore,
    Refresh,
}

/// A cycle that has been started but not yet committed.
struct InFlight {
    token: CycleToken,
    future: BoxFuture<'static, Result<Vec<KindFetch>, SyncError>>,
}

/// Runs fetch cycles against a [`JobSource`] and publishes the result.
struct HistoryPoller {
    source: Arc<dyn JobSource>,
    state: HistoryState,
    poll_interval: Duration,
    snapshot_tx: watch::Sender<HistorySnapshot>,
    event_tx: broadcast::Sender<SyncEvent>,
    /// Poll state as last announced to subscribers.
    announced: PollState,
}

impl HistoryPoller {
    fn new(
        source: Arc<dyn JobSource>,
        config: &SyncConfig,
        snapshot_tx: watch::Sender<HistorySnapshot>,
        event_tx: broadcast::Sender<SyncEvent>,
    ) -> Self {
        let state = HistoryState::new(config.filter, config.per_page).with_pages(config.pages);
        Self {
            source,
            state,
            poll_interval: config.poll_interval,
            snapshot_tx,
            event_tx,
            announced: PollState::Idle,
        }
    }

    /// Run until `cancel` fires or every handle is dropped.
    async fn run(mut self, mut commands: mpsc::Receiver<Command>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.reset();

        tracing::info!(
            filter = %self.state.filter(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "History poller started",
        );

        let mut in_flight = Some(self.start_cycle());

        loop {
            let polling = self.state.poll_state() == PollState::Polling;

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("History poller shutting down");
                    break;
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::info!("All poller handles dropped, stopping");
                        break;
                    };
                    if self.apply(command) {
                        if let Some(flight) = in_flight.take() {
                            self.abandon(flight);
                        }
                        in_flight = Some(self.start_cycle());
                    }
                }
                (token, result) = next_result(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    self.finish_cycle(token, result);
                    ticker.reset();
                }
                _ = ticker.tick(), if in_flight.is_none() && polling => {
                    tracing::debug!("Poll tick");
                    in_flight = Some(self.start_cycle());
                }
            }
        }

        if let Some(flight) = in_flight.take() {
            self.abandon(flight);
        }
        self.state.stop();
        self.announce_poll_state();
        self.publish();
    }

    /// Apply a command to the state. Returns whether a cycle must start.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::SetFilter(filter) => {
                let changed = self.state.set_filter(filter);
                if changed {
                    tracing::info!(filter = %filter, "History filter changed");
                    self.announce_poll_state();
                }
                changed
            }
            Command::LoadMore => {
                let accepted = self.state.load_more();
                if accepted {
                    tracing::info!(pages = self.state.pages_loaded(), "Loading more history");
                } else {
                    tracing::debug!("Load more ignored, nothing more to load");
                }
                accepted
            }
            Command::Refresh => {
                tracing::debug!("Refresh requested");
                true
            }
        }
    }

    fn start_cycle(&mut self) -> InFlight {
        let token = self.state.begin_cycle();
        tracing::debug!(seq = token.seq(), pages = token.plan().pages, "Starting fetch cycle");
        let future = fetch_cycle(Arc::clone(&self.source), token.plan());
        self.publish();
        InFlight { token, future }
    }

    fn abandon(&mut self, flight: InFlight) {
        let seq = flight.token.seq();
        self.state.cancel_cycle(flight.token);
        drop(flight.future);
        tracing::debug!(seq, "Fetch cycle cancelled");
        let _ = self.event_tx.send(SyncEvent::CycleDiscarded { seq });
    }

    fn finish_cycle(&mut self, token: CycleToken, result: Result<Vec<KindFetch>, SyncError>) {
        let seq = token.seq();
        let error = result.as_ref().err().map(ToString::to_string);
        let merged = result.map(|fetches| merge(&fetches));

        match self.state.commit(token, merged) {
            CommitOutcome::Applied { finished } => {
                let snapshot = self.state.snapshot();
                tracing::debug!(
                    seq,
                    records = snapshot.records.len(),
                    total = snapshot.total,
                    "Fetch cycle committed",
                );
                let _ = self.event_tx.send(SyncEvent::CycleCompleted {
                    seq,
                    records: snapshot.records.len(),
                    total: snapshot.total,
                });
                for record in finished {
                    tracing::info!(
                        job = %record.key(),
                        status = %record.status(),
                        "Job finished",
                    );
                    let _ = self.event_tx.send(SyncEvent::JobFinished { record });
                }
            }
            CommitOutcome::Failed => {
                let _ = self.event_tx.send(SyncEvent::CycleFailed {
                    seq,
                    error: error.unwrap_or_default(),
                });
            }
            CommitOutcome::Stale => {
                let _ = self.event_tx.send(SyncEvent::CycleDiscarded { seq });
            }
        }

        self.announce_poll_state();
        self.publish();
    }

    fn announce_poll_state(&mut self) {
        let current = self.state.poll_state();
        if current == self.announced {
            return;
        }
        self.announced = current;
        match current {
            PollState::Polling => {
                tracing::info!("Active jobs present, polling started");
                let _ = self.event_tx.send(SyncEvent::PollingStarted);
            }
            PollState::Idle => {
                tracing::info!("No active jobs, polling stopped");
                let _ = self.event_tx.send(SyncEvent::PollingStopped);
            }
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.snapshot());
    }
}

/// Await the in-flight cycle, if any.
async fn next_result(
    in_flight: &mut Option<InFlight>,
) -> (CycleToken, Result<Vec<KindFetch>, SyncError>) {
    match in_flight {
        Some(flight) => (flight.token, (&mut flight.future).await),
        None => std::future::pending().await,
    }
}

/// Handle to a running history poller task.
pub struct PollerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<HistorySnapshot>,
    event_tx: broadcast::Sender<SyncEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Spawn the poller task. It stops when `cancel` (or the handle's
    /// own child token) is cancelled.
    pub fn spawn(
        source: Arc<dyn JobSource>,
        config: SyncConfig,
        cancel: &CancellationToken,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshots) = watch::channel(HistorySnapshot::default());
        let cancel = cancel.child_token();

        let poller = HistoryPoller::new(source, &config, snapshot_tx, event_tx.clone());
        let task = tokio::spawn(poller.run(command_rx, cancel.clone()));

        Self {
            commands: command_tx,
            snapshots,
            event_tx,
            cancel,
            task,
        }
    }

    /// Switch the filter; a change starts a fresh page-1 cycle.
    pub async fn set_filter(&self, filter: HistoryFilter) -> Result<(), SyncError> {
        self.send(Command::SetFilter(filter)).await
    }

    /// Load one more page per kind, if more records exist.
    pub async fn load_more(&self) -> Result<(), SyncError> {
        self.send(Command::LoadMore).await
    }

    /// Run a cycle now, cancelling any in-flight one. Used to retry
    /// after an error.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.send(Command::Refresh).await
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> HistorySnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that observes every published snapshot.
    pub fn watch(&self) -> watch::Receiver<HistorySnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to sync events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    /// Stop the task and wait up to 5 seconds for it to exit.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down history poller");
        self.cancel.cancel();
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.task).await.is_err() {
            tracing::warn!("History poller did not stop in time");
        }
    }

    async fn send(&self, command: Command) -> Result<(), SyncError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SyncError::Stopped)
    }
}
