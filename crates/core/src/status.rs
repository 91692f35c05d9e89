//! Job lifecycle status as reported by the enhancement service.
//!
//! The service emits two spellings for "actively working":
//! `processing` (image jobs) and `in_progress` (video jobs). Both map to
//! [`JobStatus::Processing`]; [`JobStatus::wire_value`] restores the
//! kind-specific spelling when a status has to be sent back (list
//! filters).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::job::JobKind;

// ---------------------------------------------------------------------------
// Wire values
// ---------------------------------------------------------------------------

/// Accepted, not yet picked up by a worker.
pub const STATUS_PENDING: &str = "pending";
/// Image job currently being processed.
pub const STATUS_PROCESSING: &str = "processing";
/// Video job currently being processed.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
/// Finished successfully; artifacts are available.
pub const STATUS_COMPLETED: &str = "completed";
/// Image job failed.
pub const STATUS_FAILED: &str = "failed";
/// Video job failed.
pub const STATUS_ERROR: &str = "error";

/// Lifecycle state of one enhancement job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    /// Covers both `processing` and `in_progress` on the wire.
    Processing,
    Completed,
    Failed,
    Error,
    /// A value this client does not recognise. Never treated as active.
    Unknown(String),
}

impl JobStatus {
    /// Parse a wire value. Unrecognised values are preserved verbatim.
    pub fn from_wire(value: &str) -> Self {
        match value {
            STATUS_PENDING => Self::Pending,
            STATUS_PROCESSING | STATUS_IN_PROGRESS => Self::Processing,
            STATUS_COMPLETED => Self::Completed,
            STATUS_FAILED => Self::Failed,
            STATUS_ERROR => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Canonical string for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Processing => STATUS_PROCESSING,
            Self::Completed => STATUS_COMPLETED,
            Self::Failed => STATUS_FAILED,
            Self::Error => STATUS_ERROR,
            Self::Unknown(raw) => raw,
        }
    }

    /// The spelling the service uses for this status on jobs of `kind`.
    pub fn wire_value(&self, kind: JobKind) -> &str {
        match (self, kind) {
            (Self::Processing, JobKind::Video) => STATUS_IN_PROGRESS,
            (Self::Failed, JobKind::Video) => STATUS_ERROR,
            (Self::Error, JobKind::Image) => STATUS_FAILED,
            _ => self.as_str(),
        }
    }

    /// `true` while the job may still change on the server.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// `true` once no further transition will occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Error)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// `true` for the two terminal failure spellings.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}
