//! Canonical job record shared by image and video jobs.
//!
//! The service lists image and video jobs through separate endpoints
//! with different shapes. [`JobRecord`] folds both into one immutable
//! value tagged by [`JobKind`]; video-only metrics live in
//! [`VideoMetrics`] and are absent for images.

use std::fmt;

use serde::Serialize;

use crate::models::model_display_name;
use crate::naming::ArtifactVariant;
use crate::status::JobStatus;
use crate::types::{JobId, Timestamp};
use crate::wire::{ImageDetail, ImageHistoryItem, VideoDetail, VideoHistoryItem};

/// Discriminant for the two job families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Image,
    Video,
}

impl JobKind {
    /// Both kinds, in the order they are queried.
    pub const ALL: [JobKind; 2] = [JobKind::Image, JobKind::Video];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite identity of a job. Ids are only unique per kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JobKey {
    pub kind: JobKind,
    pub id: JobId,
}

impl JobKey {
    pub fn new(kind: JobKind, id: impl Into<JobId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Build dimensions only when both sides are known.
    pub fn from_parts(width: Option<u32>, height: Option<u32>) -> Option<Self> {
        match (width, height) {
            (Some(width), Some(height)) => Some(Self { width, height }),
            _ => None,
        }
    }
}

/// Video-only fields. Used to derive progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetrics {
    pub duration_seconds: Option<f64>,
    pub fps: Option<f64>,
    pub frame_count: Option<u64>,
    pub frames_processed: Option<u64>,
}

/// One enhancement job as observed by this client.
///
/// Records are never patched: every refresh replaces them wholesale.
/// Enhanced dimensions are only retained for completed jobs, so
/// `enhanced_dimensions().is_some()` implies `status().is_completed()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    id: JobId,
    kind: JobKind,
    original_name: String,
    description: Option<String>,
    model_type: String,
    scale: Option<u32>,
    face_enhance: bool,
    original_dimensions: Option<Dimensions>,
    enhanced_dimensions: Option<Dimensions>,
    status: JobStatus,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
    processing_time_ms: Option<u64>,
    gpu_used: Option<bool>,
    error_message: Option<String>,
    video: Option<VideoMetrics>,
}

impl JobRecord {
    pub fn from_image(item: ImageHistoryItem) -> Self {
        let enhanced = completed_only(
            &item.status,
            Dimensions::from_parts(item.enhanced_width, item.enhanced_height),
        );
        Self {
            id: item.id,
            kind: JobKind::Image,
            original_name: item.original_filename,
            description: item.description,
            model_type: item.model_type,
            scale: item.scale,
            face_enhance: item.face_enhance,
            original_dimensions: Dimensions::from_parts(item.original_width, item.original_height),
            enhanced_dimensions: enhanced,
            status: item.status,
            created_at: item.created_at,
            completed_at: item.completed_at,
            processing_time_ms: item.processing_time_ms,
            gpu_used: item.gpu_used,
            error_message: item.error_message,
            video: None,
        }
    }

    pub fn from_video(item: VideoHistoryItem) -> Self {
        let enhanced = completed_only(
            &item.status,
            Dimensions::from_parts(item.enhanced_width, item.enhanced_height),
        );
        Self {
            id: item.id,
            kind: JobKind::Video,
            original_name: item.original_filename,
            description: item.description,
            model_type: item.model_type,
            scale: item.scale,
            face_enhance: item.face_enhance,
            original_dimensions: Dimensions::from_parts(item.original_width, item.original_height),
            enhanced_dimensions: enhanced,
            status: item.status,
            created_at: item.created_at,
            completed_at: item.completed_at,
            processing_time_ms: item.processing_time_ms,
            gpu_used: item.gpu_used,
            error_message: item.error_message,
            video: Some(VideoMetrics {
                duration_seconds: item.duration_seconds,
                fps: item.fps,
                frame_count: item.frame_count,
                frames_processed: item.frames_processed,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(self.kind, self.id.clone())
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Raw enhancement profile identifier (e.g. `general_x4`).
    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Human-readable profile name, falling back to the raw identifier.
    pub fn model_display_name(&self) -> &str {
        model_display_name(&self.model_type)
    }

    pub fn scale(&self) -> Option<u32> {
        self.scale
    }

    pub fn face_enhance(&self) -> bool {
        self.face_enhance
    }

    pub fn original_dimensions(&self) -> Option<Dimensions> {
        self.original_dimensions
    }

    pub fn enhanced_dimensions(&self) -> Option<Dimensions> {
        self.enhanced_dimensions
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn processing_time_ms(&self) -> Option<u64> {
        self.processing_time_ms
    }

    pub fn gpu_used(&self) -> Option<bool> {
        self.gpu_used
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Video metrics, `None` for image jobs.
    pub fn video(&self) -> Option<&VideoMetrics> {
        self.video.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// `false` when a completed job arrived without enhanced dimensions.
    pub fn is_consistent(&self) -> bool {
        self.enhanced_dimensions.is_some() == self.status.is_completed()
    }

    /// Processing progress in percent.
    ///
    /// `None` for image jobs. Videos report 100 once completed, 0 while
    /// frame counts are unknown, and clamp over-reported frame counts
    /// to 100.
    pub fn progress_percent(&self) -> Option<u8> {
        let video = self.video.as_ref()?;
        if self.status.is_completed() {
            return Some(100);
        }
        let (Some(total), Some(done)) = (video.frame_count, video.frames_processed) else {
            return Some(0);
        };
        if total == 0 {
            return Some(0);
        }
        let percent = (done as f64 / total as f64 * 100.0).round();
        Some(percent.min(100.0) as u8)
    }
}

fn completed_only(status: &JobStatus, dims: Option<Dimensions>) -> Option<Dimensions> {
    if status.is_completed() {
        dims
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Listing and detail results
// ---------------------------------------------------------------------------

/// One page of records of a single kind plus the kind's reported total.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPage {
    pub total: u64,
    pub records: Vec<JobRecord>,
}

/// A job together with its base64 payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDetail {
    pub record: JobRecord,
    pub original_base64: Option<String>,
    pub enhanced_base64: Option<String>,
}

impl JobDetail {
    pub fn from_image(detail: ImageDetail) -> Self {
        Self {
            record: JobRecord::from_image(detail.item),
            original_base64: detail.original_base64,
            enhanced_base64: detail.enhanced_base64,
        }
    }

    pub fn from_video(detail: VideoDetail) -> Self {
        Self {
            record: JobRecord::from_video(detail.item),
            original_base64: detail.original_base64,
            enhanced_base64: detail.enhanced_base64,
        }
    }

    /// Base64 payload for `variant`, if the service returned a non-empty one.
    pub fn payload(&self, variant: ArtifactVariant) -> Option<&str> {
        let payload = match variant {
            ArtifactVariant::Original => self.original_base64.as_deref(),
            ArtifactVariant::Enhanced => self.enhanced_base64.as_deref(),
        };
        payload.filter(|p| !p.is_empty())
    }
}
