//! Domain model shared by the enhancer client crates.
//!
//! Holds the canonical [`JobRecord`](job::JobRecord) shape, the wire
//! types exchanged with the enhancement service, and the small pure
//! helpers (naming, MIME lookup, timestamp parsing) the rest of the
//! workspace builds on.

pub mod error;
pub mod filter;
pub mod format;
pub mod job;
pub mod models;
pub mod naming;
pub mod status;
pub mod timestamp;
pub mod types;
pub mod wire;
