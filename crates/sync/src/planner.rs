//! Fetch planner: which list queries one cycle issues.
//!
//! A cycle queries every kind the filter includes. Kinds are fetched
//! concurrently; pages within a kind are fetched in order, `1..=pages`,
//! so that "load more" accumulates rather than replaces. Any failed
//! query fails the whole cycle.

use std::sync::Arc;

use enhancer_client::source::JobSource;
use enhancer_core::filter::{HistoryFilter, PAGE_SIZE};
use enhancer_core::job::{JobKind, JobRecord};
use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::error::SyncError;

/// The queries one fetch cycle issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePlan {
    pub filter: HistoryFilter,
    /// Pages to load per kind, starting at 1.
    pub pages: u32,
    pub per_page: u32,
}

impl Default for CyclePlan {
    fn default() -> Self {
        Self {
            filter: HistoryFilter::default(),
            pages: 1,
            per_page: PAGE_SIZE,
        }
    }
}

/// Everything fetched for one kind in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct KindFetch {
    pub kind: JobKind,
    /// Total reported by the most recent page.
    pub total: u64,
    /// Records of pages `1..=n` in page order.
    pub records: Vec<JobRecord>,
}

/// Run one fetch cycle.
///
/// The returned future owns everything it needs, so the caller can keep
/// it alongside other work and drop it to cancel the cycle.
pub fn fetch_cycle(
    source: Arc<dyn JobSource>,
    plan: CyclePlan,
) -> BoxFuture<'static, Result<Vec<KindFetch>, SyncError>> {
    async move {
        let fetches = plan
            .filter
            .kinds()
            .iter()
            .map(|&kind| fetch_kind(source.as_ref(), kind, plan.pages, plan.per_page));
        future::try_join_all(fetches).await
    }
    .boxed()
}

/// Fetch pages `1..=pages` of one kind.
///
/// Stops early once the kind's total is covered or a short page arrives.
pub async fn fetch_kind(
    source: &dyn JobSource,
    kind: JobKind,
    pages: u32,
    per_page: u32,
) -> Result<KindFetch, SyncError> {
    let mut total = 0;
    let mut records = Vec::new();

    for page in 1..=pages.max(1) {
        let fetched = source
            .list(kind, page, per_page)
            .await
            .map_err(|source| SyncError::Source { kind, source })?;

        tracing::debug!(
            kind = %kind,
            page,
            count = fetched.records.len(),
            total = fetched.total,
            "Fetched history page",
        );

        let short = fetched.records.len() < per_page as usize;
        total = fetched.total;
        records.extend(fetched.records);

        if short || records.len() as u64 >= total {
            break;
        }
    }

    Ok(KindFetch {
        kind,
        total,
        records,
    })
}
