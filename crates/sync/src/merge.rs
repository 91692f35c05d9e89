//! Merge & order: per-kind fetches into one newest-first list.

use std::collections::HashSet;

use enhancer_core::job::JobRecord;

use crate::planner::KindFetch;

/// The merged result of one fetch cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedHistory {
    /// Records in descending `created_at` order.
    pub records: Vec<JobRecord>,
    /// Sum of the per-kind totals.
    pub total: u64,
    /// `records.len() < total`. A heuristic: kinds paginate
    /// independently, so more records may exist even when this is false
    /// for one kind's share.
    pub has_more: bool,
}

/// Merge the per-kind fetches of one cycle.
///
/// Pure: the same input always yields the same output. The sort is
/// stable, so records sharing a `created_at` keep their input order
/// (kind order, then page order). A record repeated under the same
/// composite key keeps its first occurrence.
pub fn merge(fetches: &[KindFetch]) -> MergedHistory {
    let total = fetches.iter().map(|f| f.total).sum();

    let mut seen = HashSet::new();
    let mut records: Vec<JobRecord> = fetches
        .iter()
        .flat_map(|f| f.records.iter())
        .filter(|r| seen.insert(r.key()))
        .cloned()
        .collect();

    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

    let has_more = (records.len() as u64) < total;
    MergedHistory {
        records,
        total,
        has_more,
    }
}
