//! Request and response bodies exchanged with the enhancement service.
//!
//! Field names mirror the service's JSON exactly. Optional numeric
//! fields stay `Option` so an unknown value is never confused with zero.

use serde::{Deserialize, Serialize};

use crate::status::JobStatus;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// History items
// ---------------------------------------------------------------------------

/// One image job as returned by `GET /api/images`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageHistoryItem {
    pub id: JobId,
    pub original_filename: String,
    #[serde(default)]
    pub description: Option<String>,
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    pub enhanced_width: Option<u32>,
    pub enhanced_height: Option<u32>,
    pub model_type: String,
    pub scale: Option<u32>,
    #[serde(default)]
    pub face_enhance: bool,
    pub status: JobStatus,
    pub processing_time_ms: Option<u64>,
    pub gpu_used: Option<bool>,
    #[serde(with = "crate::timestamp::serde_utc")]
    pub created_at: Timestamp,
    #[serde(default, with = "crate::timestamp::serde_utc_option")]
    pub completed_at: Option<Timestamp>,
    pub error_message: Option<String>,
}

/// One video job as returned by `GET /api/videos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoHistoryItem {
    pub id: JobId,
    pub original_filename: String,
    #[serde(default)]
    pub description: Option<String>,
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    pub enhanced_width: Option<u32>,
    pub enhanced_height: Option<u32>,
    pub model_type: String,
    pub scale: Option<u32>,
    #[serde(default)]
    pub face_enhance: bool,
    pub status: JobStatus,
    pub duration_seconds: Option<f64>,
    pub fps: Option<f64>,
    pub frame_count: Option<u64>,
    pub frames_processed: Option<u64>,
    pub processing_time_ms: Option<u64>,
    pub gpu_used: Option<bool>,
    #[serde(with = "crate::timestamp::serde_utc")]
    pub created_at: Timestamp,
    #[serde(default, with = "crate::timestamp::serde_utc_option")]
    pub completed_at: Option<Timestamp>,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// List / detail envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageListResponse {
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub images: Vec<ImageHistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoListResponse {
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub videos: Vec<VideoHistoryItem>,
}

/// Image detail: the list shape plus both base64 payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDetail {
    #[serde(flatten)]
    pub item: ImageHistoryItem,
    #[serde(default)]
    pub original_base64: Option<String>,
    #[serde(default)]
    pub enhanced_base64: Option<String>,
}

/// Video detail: the list shape plus both base64 payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub item: VideoHistoryItem,
    #[serde(default)]
    pub original_base64: Option<String>,
    #[serde(default)]
    pub enhanced_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDetailResponse {
    pub image: ImageDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetailResponse {
    pub video: VideoDetail,
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Body for `POST /api/images/enhance`.
#[derive(Debug, Clone, Serialize)]
pub struct ImageEnhanceRequest {
    pub image_base64: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub face_enhance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_height: Option<u32>,
}

/// Body for `POST /api/videos/enhance`.
#[derive(Debug, Clone, Serialize)]
pub struct VideoEnhanceRequest {
    pub video_base64: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub face_enhance: bool,
}

/// Image enhancement runs synchronously; the response carries the
/// finished job including payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageEnhanceResponse {
    pub message: String,
    pub image: ImageDetail,
}

/// Accepted video job. Completion is observed through the list and
/// detail endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoSubmission {
    pub id: JobId,
    pub original_filename: String,
    pub status: JobStatus,
    pub duration_seconds: Option<f64>,
    pub fps: Option<f64>,
    pub frame_count: Option<u64>,
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    pub frames_processed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoEnhanceResponse {
    pub message: String,
    pub video: VideoSubmission,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    #[serde(with = "crate::timestamp::serde_utc")]
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

/// Generic `{"message": ...}` acknowledgement (deletes, logout).
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error envelope the service writes for every non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
