/// Job identifiers are opaque strings assigned by the enhancement service.
/// They are only unique within one job kind.
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
