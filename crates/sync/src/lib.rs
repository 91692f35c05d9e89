//! History synchronization engine.
//!
//! Keeps a merged, newest-first view of a user's image and video jobs in
//! step with the enhancement service: plans the list queries for a view
//! filter, merges the per-kind pages, commits results through
//! sequence-numbered cycle tokens, polls while any job is still active,
//! and retrieves finished artifacts with per-key coalescing.

pub mod error;
pub mod events;
pub mod merge;
pub mod planner;
pub mod poller;
pub mod retrieval;
pub mod state;

#[cfg(test)]
mod test_support;
