//! Artifact retrieval for completed jobs.
//!
//! List responses carry no payloads, so retrieving a file means fetching
//! the job detail and decoding one of its base64 fields. Requests are
//! coalesced per `(job, variant)`: while one is in flight, further
//! requests for the same key await the same result instead of issuing a
//! second detail call. Each download runs on its own task, so it finishes
//! and releases its slot even if every caller stops waiting.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use enhancer_client::source::JobSource;
use enhancer_core::job::{JobKey, JobRecord};
use enhancer_core::naming::{artifact_filename, mime_type_for, ArtifactVariant};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::Mutex;

/// Used when a job's filename has no final component.
const FALLBACK_FILENAME: &str = "artifact";

type RetrievalKey = (JobKey, ArtifactVariant);
type PendingRetrieval = Shared<BoxFuture<'static, Result<Arc<Artifact>, RetrievalError>>>;

/// Errors from artifact retrieval. All of them leave the history view
/// untouched and may be retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalError {
    /// Only completed jobs have artifacts. No request was issued.
    #[error("Job {0} is not completed")]
    NotCompleted(JobKey),

    /// The detail response lacked the requested payload.
    #[error("The {variant} file of job {key} is unavailable")]
    PayloadUnavailable {
        key: JobKey,
        variant: ArtifactVariant,
    },

    /// The detail request failed.
    #[error("Failed to fetch job {key}: {message}")]
    Transport {
        key: JobKey,
        message: String,
        retryable: bool,
    },

    /// The download task ended without producing a result.
    #[error("Retrieval of job {key} was interrupted: {message}")]
    Interrupted { key: JobKey, message: String },

    /// The payload was not valid base64.
    #[error("Failed to decode the {variant} file of job {key}: {message}")]
    Decode {
        key: JobKey,
        variant: ArtifactVariant,
        message: String,
    },
}

/// A decoded, ready-to-save file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub key: JobKey,
    pub variant: ArtifactVariant,
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write the artifact into `dir` under its derived filename.
    ///
    /// Creates `dir` if needed and returns the written path. Directory
    /// components in the filename are ignored.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        let name = Path::new(&self.filename)
            .file_name()
            .unwrap_or_else(|| OsStr::new(FALLBACK_FILENAME));
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(name);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!(
            job = %self.key,
            variant = %self.variant,
            path = %path.display(),
            size_bytes = self.bytes.len(),
            "Artifact saved",
        );
        Ok(path)
    }
}

/// Fetches artifacts, at most one request per `(job, variant)` at a time.
pub struct ArtifactRetriever {
    source: Arc<dyn JobSource>,
    in_flight: Arc<Mutex<HashMap<RetrievalKey, PendingRetrieval>>>,
}

impl ArtifactRetriever {
    pub fn new(source: Arc<dyn JobSource>) -> Self {
        Self {
            source,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether a retrieval for this key is outstanding.
    pub async fn is_in_flight(&self, key: &JobKey, variant: ArtifactVariant) -> bool {
        self.in_flight
            .lock()
            .await
            .contains_key(&(key.clone(), variant))
    }

    /// Retrieve one variant of a completed job.
    ///
    /// Joins an outstanding retrieval for the same key if there is one.
    pub async fn retrieve(
        &self,
        record: &JobRecord,
        variant: ArtifactVariant,
    ) -> Result<Arc<Artifact>, RetrievalError> {
        if !record.status().is_completed() {
            return Err(RetrievalError::NotCompleted(record.key()));
        }

        let key = (record.key(), variant);
        let pending = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(&key) {
                Some(existing) => {
                    tracing::debug!(job = %key.0, variant = %variant, "Joining in-flight retrieval");
                    existing.clone()
                }
                None => {
                    let task = tokio::spawn(download(
                        Arc::clone(&self.source),
                        Arc::clone(&self.in_flight),
                        key.clone(),
                        record.original_name().to_string(),
                    ));
                    let job = key.0.clone();
                    let pending = async move {
                        task.await.unwrap_or_else(|e| {
                            Err(RetrievalError::Interrupted {
                                key: job,
                                message: e.to_string(),
                            })
                        })
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(key, pending.clone());
                    pending
                }
            }
        };

        pending.await
    }
}

/// Fetch, decode, and release the in-flight slot. Runs on its own task.
async fn download(
    source: Arc<dyn JobSource>,
    in_flight: Arc<Mutex<HashMap<RetrievalKey, PendingRetrieval>>>,
    key: RetrievalKey,
    original_name: String,
) -> Result<Arc<Artifact>, RetrievalError> {
    let result = fetch_artifact(source.as_ref(), &key.0, key.1, &original_name).await;
    in_flight.lock().await.remove(&key);

    if let Err(e) = &result {
        tracing::warn!(job = %key.0, variant = %key.1, error = %e, "Artifact retrieval failed");
    }
    result.map(Arc::new)
}

async fn fetch_artifact(
    source: &dyn JobSource,
    key: &JobKey,
    variant: ArtifactVariant,
    original_name: &str,
) -> Result<Artifact, RetrievalError> {
    tracing::info!(job = %key, variant = %variant, "Retrieving artifact");

    let detail = source
        .detail(key.kind, &key.id)
        .await
        .map_err(|e| RetrievalError::Transport {
            key: key.clone(),
            message: e.to_string(),
            retryable: e.is_retryable(),
        })?;

    let payload = detail
        .payload(variant)
        .ok_or_else(|| RetrievalError::PayloadUnavailable {
            key: key.clone(),
            variant,
        })?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| RetrievalError::Decode {
            key: key.clone(),
            variant,
            message: e.to_string(),
        })?;

    let filename = artifact_filename(original_name, variant);
    let mime_type = mime_type_for(&filename);

    Ok(Artifact {
        key: key.clone(),
        variant,
        filename,
        mime_type,
        bytes,
    })
}
