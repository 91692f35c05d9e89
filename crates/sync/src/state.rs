//! Owned history state with a sequence-numbered commit protocol.
//!
//! Every fetch cycle begins by taking a [`CycleToken`]. Only the newest
//! token may commit: a result carrying an older sequence number than the
//! last committed one, or one issued before the view was reset, is
//! discarded. This keeps a slow cycle from overwriting a newer list.

use std::collections::HashSet;

use chrono::Utc;
use enhancer_core::filter::{HistoryFilter, PAGE_SIZE};
use enhancer_core::job::{JobKey, JobRecord};
use enhancer_core::types::Timestamp;

use crate::error::SyncError;
use crate::merge::MergedHistory;
use crate::planner::CyclePlan;

/// Whether periodic refresh is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Polling,
}

/// Proof that a cycle was started, and with which plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleToken {
    seq: u64,
    plan: CyclePlan,
}

impl CycleToken {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn plan(&self) -> CyclePlan {
        self.plan
    }
}

/// Result of [`HistoryState::commit`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The list was replaced. `finished` holds jobs that were active in
    /// the previous list and are terminal in the new one.
    Applied { finished: Vec<JobRecord> },
    /// The cycle failed. The previous list is retained and the error is
    /// recorded.
    Failed,
    /// A newer cycle already committed, or the view was reset since the
    /// token was issued. Nothing changed.
    Stale,
}

/// Read-only copy of the history view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySnapshot {
    pub filter: HistoryFilter,
    pub pages_loaded: u32,
    pub records: Vec<JobRecord>,
    pub total: u64,
    pub has_more: bool,
    pub poll_state: PollState,
    /// Message of the most recent failed cycle, cleared on success.
    pub error: Option<String>,
    /// A cycle is in flight.
    pub loading: bool,
    /// Sequence number of the last committed cycle (0 before the first).
    pub committed_seq: u64,
    pub last_synced_at: Option<Timestamp>,
}

/// The history view and its cycle bookkeeping.
#[derive(Debug, Clone)]
pub struct HistoryState {
    filter: HistoryFilter,
    pages_loaded: u32,
    per_page: u32,
    records: Vec<JobRecord>,
    total: u64,
    has_more: bool,
    error: Option<String>,
    last_synced_at: Option<Timestamp>,
    /// Last sequence number handed out.
    issued_seq: u64,
    /// Last sequence number that committed, successfully or not.
    committed_seq: u64,
    /// Tokens with `seq <= invalidated_seq` may no longer commit.
    invalidated_seq: u64,
    /// Set once the owning poller has stopped.
    stopped: bool,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::new(HistoryFilter::default(), PAGE_SIZE)
    }
}

impl HistoryState {
    pub fn new(filter: HistoryFilter, per_page: u32) -> Self {
        Self {
            filter,
            pages_loaded: 1,
            per_page,
            records: Vec::new(),
            total: 0,
            has_more: false,
            error: None,
            last_synced_at: None,
            issued_seq: 0,
            committed_seq: 0,
            invalidated_seq: 0,
            stopped: false,
        }
    }

    /// Start with `pages` pages per kind instead of one.
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages_loaded = pages.max(1);
        self
    }

    pub fn filter(&self) -> HistoryFilter {
        self.filter
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// The plan the next cycle should run.
    pub fn plan(&self) -> CyclePlan {
        CyclePlan {
            filter: self.filter,
            pages: self.pages_loaded,
            per_page: self.per_page,
        }
    }

    /// Polling while any displayed job is pending or processing, until
    /// [`stop`](Self::stop) is called.
    pub fn poll_state(&self) -> PollState {
        if !self.stopped && self.records.iter().any(JobRecord::is_active) {
            PollState::Polling
        } else {
            PollState::Idle
        }
    }

    /// Whether a started cycle has neither committed nor been abandoned.
    pub fn is_loading(&self) -> bool {
        self.issued_seq > self.committed_seq.max(self.invalidated_seq)
    }

    /// Start a cycle for the current plan.
    pub fn begin_cycle(&mut self) -> CycleToken {
        self.issued_seq += 1;
        CycleToken {
            seq: self.issued_seq,
            plan: self.plan(),
        }
    }

    /// Abandon a started cycle; its result will be treated as stale.
    pub fn cancel_cycle(&mut self, token: CycleToken) {
        self.invalidated_seq = self.invalidated_seq.max(token.seq);
    }

    /// Commit the result of the cycle identified by `token`.
    pub fn commit(
        &mut self,
        token: CycleToken,
        result: Result<MergedHistory, SyncError>,
    ) -> CommitOutcome {
        if token.seq <= self.invalidated_seq || token.seq <= self.committed_seq {
            tracing::debug!(
                seq = token.seq,
                committed_seq = self.committed_seq,
                "Discarding stale fetch cycle",
            );
            return CommitOutcome::Stale;
        }
        self.committed_seq = token.seq;

        let merged = match result {
            Ok(merged) => merged,
            Err(e) => {
                tracing::warn!(seq = token.seq, error = %e, "Fetch cycle failed, keeping previous list");
                self.error = Some(e.to_string());
                return CommitOutcome::Failed;
            }
        };

        for record in merged.records.iter().filter(|r| !r.is_consistent()) {
            tracing::warn!(
                job = %record.key(),
                status = %record.status(),
                "Completed job reported without enhanced dimensions",
            );
        }

        let was_active: HashSet<JobKey> = self
            .records
            .iter()
            .filter(|r| r.is_active())
            .map(JobRecord::key)
            .collect();
        let finished = merged
            .records
            .iter()
            .filter(|r| r.status().is_terminal() && was_active.contains(&r.key()))
            .cloned()
            .collect();

        self.records = merged.records;
        self.total = merged.total;
        self.has_more = merged.has_more;
        self.error = None;
        self.last_synced_at = Some(Utc::now());

        CommitOutcome::Applied { finished }
    }

    /// Switch the view filter.
    ///
    /// A change clears the displayed list, resets to page 1, and voids
    /// every outstanding token. Returns `false` if the filter is unchanged.
    pub fn set_filter(&mut self, filter: HistoryFilter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.pages_loaded = 1;
        self.records.clear();
        self.total = 0;
        self.has_more = false;
        self.error = None;
        self.invalidated_seq = self.issued_seq;
        true
    }

    /// Disarm polling for good and void every outstanding token. The
    /// displayed list is kept.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.invalidated_seq = self.issued_seq;
    }

    /// Load one more page per kind on the next cycle.
    ///
    /// Returns `false` when nothing more is known to exist. Outstanding
    /// tokens are voided, since they would commit fewer pages.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more {
            return false;
        }
        self.pages_loaded += 1;
        self.invalidated_seq = self.issued_seq;
        true
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            filter: self.filter,
            pages_loaded: self.pages_loaded,
            records: self.records.clone(),
            total: self.total,
            has_more: self.has_more,
            poll_state: self.poll_state(),
            error: self.error.clone(),
            loading: self.is_loading(),
            committed_seq: self.committed_seq,
            last_synced_at: self.last_synced_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use enhancer_client::error::EnhanceApiError;
    use enhancer_core::job::JobKind;

    use super::*;
    use crate::merge::merge;
    use crate::test_support::{fetched, image, video};

    fn images(records: Vec<JobRecord>) -> MergedHistory {
        let total = records.len() as u64;
        merge(&[fetched(JobKind::Image, total, records)])
    }

    fn failure() -> SyncError {
        SyncError::Source {
            kind: JobKind::Image,
            source: EnhanceApiError::Api {
                status: 502,
                message: "bad gateway".into(),
            },
        }
    }

    // ---------------------------------------------------------------------------
    // Sequencing
    // ---------------------------------------------------------------------------

    #[test]
    fn late_result_does_not_overwrite_newer_one() {
        let mut state = HistoryState::default();
        let older = state.begin_cycle();
        let newer = state.begin_cycle();

        let newer_list = images(vec![image("b", "completed", "2024-01-02T00:00:00Z")]);
        assert_matches!(state.commit(newer, Ok(newer_list.clone())), CommitOutcome::Applied { .. });

        let older_list = images(vec![image("a", "pending", "2024-01-01T00:00:00Z")]);
        assert_eq!(state.commit(older, Ok(older_list)), CommitOutcome::Stale);

        assert_eq!(state.records(), newer_list.records.as_slice());
        assert_eq!(state.snapshot().committed_seq, newer.seq());
    }

    #[test]
    fn same_token_commits_once() {
        let mut state = HistoryState::default();
        let token = state.begin_cycle();

        state.commit(token, Ok(images(vec![])));

        assert_eq!(state.commit(token, Ok(images(vec![]))), CommitOutcome::Stale);
    }

    #[test]
    fn cancelled_cycle_is_stale_and_not_loading() {
        let mut state = HistoryState::default();
        let token = state.begin_cycle();
        assert!(state.is_loading());

        state.cancel_cycle(token);

        assert!(!state.is_loading());
        let list = images(vec![image("a", "pending", "2024-01-01T00:00:00Z")]);
        assert_eq!(state.commit(token, Ok(list)), CommitOutcome::Stale);
        assert!(state.records().is_empty());
    }

    // ---------------------------------------------------------------------------
    // Filter and pagination
    // ---------------------------------------------------------------------------

    #[test]
    fn filter_change_clears_view_and_voids_tokens() {
        let mut state = HistoryState::default();
        let first = state.begin_cycle();
        state.commit(first, Ok(images(vec![image("a", "completed", "2024-01-01T00:00:00Z")])));
        let in_flight = state.begin_cycle();

        assert!(state.set_filter(HistoryFilter::Videos));

        assert!(state.records().is_empty());
        assert_eq!(state.pages_loaded(), 1);
        assert_eq!(state.plan().filter, HistoryFilter::Videos);
        assert_eq!(
            state.commit(in_flight, Ok(images(vec![image("b", "completed", "2024-01-02T00:00:00Z")]))),
            CommitOutcome::Stale
        );
        assert!(state.records().is_empty());
    }

    #[test]
    fn unchanged_filter_is_a_no_op() {
        let mut state = HistoryState::new(HistoryFilter::Images, PAGE_SIZE);
        let token = state.begin_cycle();

        assert!(!state.set_filter(HistoryFilter::Images));
        assert_matches!(state.commit(token, Ok(images(vec![]))), CommitOutcome::Applied { .. });
    }

    #[test]
    fn load_more_requires_more_records() {
        let mut state = HistoryState::default();
        assert!(!state.load_more());

        let token = state.begin_cycle();
        let partial = merge(&[fetched(
            JobKind::Image,
            40,
            vec![image("a", "completed", "2024-01-01T00:00:00Z")],
        )]);
        state.commit(token, Ok(partial));

        assert!(state.load_more());
        assert_eq!(state.pages_loaded(), 2);
        assert_eq!(state.begin_cycle().plan().pages, 2);
    }

    // ---------------------------------------------------------------------------
    // Polling state and failures
    // ---------------------------------------------------------------------------

    #[test]
    fn single_completed_image_stays_idle() {
        let mut state = HistoryState::default();
        let token = state.begin_cycle();
        let merged = merge(&[
            fetched(JobKind::Image, 1, vec![image("a", "completed", "2024-01-01T00:00:00Z")]),
            fetched(JobKind::Video, 0, vec![]),
        ]);

        state.commit(token, Ok(merged));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.records.len(), 1);
        assert!(!snapshot.has_more);
        assert_eq!(snapshot.poll_state, PollState::Idle);
    }

    #[test]
    fn in_progress_video_polls_and_reports_half_progress() {
        let mut state = HistoryState::new(HistoryFilter::Videos, PAGE_SIZE);
        let token = state.begin_cycle();
        let merged = merge(&[fetched(
            JobKind::Video,
            1,
            vec![video("v", "in_progress", "2024-01-01T00:00:00Z", (100, 50))],
        )]);

        state.commit(token, Ok(merged));

        assert_eq!(state.poll_state(), PollState::Polling);
        assert_eq!(state.records()[0].progress_percent(), Some(50));
    }

    #[test]
    fn failed_cycle_keeps_previous_list() {
        let mut state = HistoryState::default();
        let first = state.begin_cycle();
        let list = images(vec![image("a", "completed", "2024-01-01T00:00:00Z")]);
        state.commit(first, Ok(list.clone()));

        let second = state.begin_cycle();
        assert_eq!(state.commit(second, Err(failure())), CommitOutcome::Failed);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.records, list.records);
        assert!(snapshot.error.unwrap().contains("bad gateway"));
        assert_eq!(snapshot.poll_state, PollState::Idle);
        assert!(!snapshot.loading);
    }

    #[test]
    fn success_clears_previous_error() {
        let mut state = HistoryState::default();
        let failed = state.begin_cycle();
        state.commit(failed, Err(failure()));
        assert!(state.error().is_some());

        let retried = state.begin_cycle();
        state.commit(retried, Ok(images(vec![])));

        assert_eq!(state.error(), None);
        assert!(state.snapshot().last_synced_at.is_some());
    }

    #[test]
    fn reports_jobs_that_finished_between_cycles() {
        let mut state = HistoryState::default();
        let first = state.begin_cycle();
        state.commit(
            first,
            Ok(images(vec![
                image("a", "pending", "2024-01-02T00:00:00Z"),
                image("b", "processing", "2024-01-01T00:00:00Z"),
            ])),
        );
        assert_eq!(state.poll_state(), PollState::Polling);

        let second = state.begin_cycle();
        let outcome = state.commit(
            second,
            Ok(images(vec![
                image("a", "completed", "2024-01-02T00:00:00Z"),
                image("b", "processing", "2024-01-01T00:00:00Z"),
            ])),
        );

        assert_matches!(outcome, CommitOutcome::Applied { ref finished } if finished.len() == 1 && finished[0].id() == "a");
        assert_eq!(state.poll_state(), PollState::Polling);

        let third = state.begin_cycle();
        let outcome = state.commit(
            third,
            Ok(images(vec![
                image("a", "completed", "2024-01-02T00:00:00Z"),
                image("b", "failed", "2024-01-01T00:00:00Z"),
            ])),
        );

        assert_matches!(outcome, CommitOutcome::Applied { ref finished } if finished.len() == 1 && finished[0].id() == "b");
        assert_eq!(state.poll_state(), PollState::Idle);
    }

    #[test]
    fn stop_goes_idle_and_keeps_the_list() {
        let mut state = HistoryState::default();
        let first = state.begin_cycle();
        state.commit(first, Ok(images(vec![image("a", "pending", "2024-01-01T00:00:00Z")])));
        let in_flight = state.begin_cycle();
        assert_eq!(state.poll_state(), PollState::Polling);

        state.stop();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.poll_state, PollState::Idle);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(state.commit(in_flight, Ok(images(vec![]))), CommitOutcome::Stale);
    }

    #[test]
    fn filter_change_goes_idle_until_the_next_commit() {
        let mut state = HistoryState::default();
        let first = state.begin_cycle();
        state.commit(first, Ok(images(vec![image("a", "pending", "2024-01-01T00:00:00Z")])));
        assert_eq!(state.poll_state(), PollState::Polling);

        state.set_filter(HistoryFilter::Images);

        assert_eq!(state.poll_state(), PollState::Idle);
    }

    #[test]
    fn unknown_status_does_not_keep_polling() {
        let mut state = HistoryState::default();
        let token = state.begin_cycle();

        state.commit(token, Ok(images(vec![image("a", "queued", "2024-01-01T00:00:00Z")])));

        assert_eq!(state.poll_state(), PollState::Idle);
    }
}
