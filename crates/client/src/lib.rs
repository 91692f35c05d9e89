//! REST client for the media enhancement service.
//!
//! [`EnhanceApi`](api::EnhanceApi) wraps every HTTP endpoint (history
//! listing, job detail, submission, auth) using [`reqwest`].
//! [`JobSource`](source::JobSource) is the narrow, object-safe view of
//! it that the history sync engine consumes.

pub mod api;
pub mod config;
pub mod error;
pub mod source;
