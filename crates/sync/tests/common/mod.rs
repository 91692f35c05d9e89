//! Shared fixtures for sync integration tests.
//!
//! [`FakeSource`] plays the enhancement service: it holds the current job
//! list per kind, paginates it on request, and counts every call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use enhancer_client::error::EnhanceApiError;
use enhancer_client::source::JobSource;
use enhancer_core::job::{JobDetail, JobKey, JobKind, JobPage, JobRecord};
use enhancer_core::status::JobStatus;
use enhancer_core::timestamp::parse_timestamp;
use enhancer_core::wire::{ImageHistoryItem, VideoHistoryItem};

/// Scripted [`JobSource`].
#[derive(Default)]
pub struct FakeSource {
    jobs: Mutex<HashMap<JobKind, Vec<JobRecord>>>,
    failing: Mutex<Vec<JobKind>>,
    details: Mutex<HashMap<JobKey, JobDetail>>,
    list_delay: Mutex<Option<Duration>>,
    detail_delay: Mutex<Option<Duration>>,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    active_lists: AtomicUsize,
    peak_lists: AtomicUsize,
}

/// Decrements a concurrency counter when a call finishes or is dropped.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the jobs of `kind`, newest first.
    pub fn set_jobs(&self, kind: JobKind, records: Vec<JobRecord>) {
        self.jobs.lock().unwrap().insert(kind, records);
    }

    /// Make every list call for `kind` fail with a 500.
    pub fn fail(&self, kind: JobKind) {
        self.failing.lock().unwrap().push(kind);
    }

    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn set_detail(&self, detail: JobDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.record.key(), detail);
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_detail_delay(&self, delay: Duration) {
        *self.detail_delay.lock().unwrap() = Some(delay);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Most list calls ever outstanding at once.
    pub fn peak_concurrent_lists(&self) -> usize {
        self.peak_lists.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobSource for FakeSource {
    async fn list(&self, kind: JobKind, page: u32, per_page: u32) -> Result<JobPage, EnhanceApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active_lists.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_lists.fetch_max(active, Ordering::SeqCst);
        let _active = ActiveGuard(&self.active_lists);

        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&kind) {
            return Err(EnhanceApiError::Api {
                status: 500,
                message: format!("{kind} listing unavailable"),
            });
        }

        let jobs = self.jobs.lock().unwrap();
        let all = jobs.get(&kind).map(Vec::as_slice).unwrap_or_default();
        let start = ((page - 1) * per_page) as usize;
        let records = all
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();

        Ok(JobPage {
            total: all.len() as u64,
            records,
        })
    }

    async fn detail(&self, kind: JobKind, id: &str) -> Result<JobDetail, EnhanceApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.detail_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.details
            .lock()
            .unwrap()
            .get(&JobKey::new(kind, id))
            .cloned()
            .ok_or_else(|| EnhanceApiError::Api {
                status: 404,
                message: format!("{kind} {id} not found"),
            })
    }
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

pub fn image_named(id: &str, filename: &str, status: &str, created_at: &str) -> JobRecord {
    JobRecord::from_image(ImageHistoryItem {
        id: id.to_string(),
        original_filename: filename.to_string(),
        description: None,
        original_width: Some(320),
        original_height: Some(240),
        enhanced_width: Some(1280),
        enhanced_height: Some(960),
        model_type: "general_x4".to_string(),
        scale: Some(4),
        face_enhance: false,
        status: JobStatus::from_wire(status),
        processing_time_ms: Some(900),
        gpu_used: Some(true),
        created_at: parse_timestamp(created_at).unwrap(),
        completed_at: None,
        error_message: None,
    })
}

pub fn image(id: &str, status: &str, created_at: &str) -> JobRecord {
    image_named(id, &format!("{id}.png"), status, created_at)
}

pub fn video_named(id: &str, filename: &str, status: &str, created_at: &str) -> JobRecord {
    JobRecord::from_video(VideoHistoryItem {
        id: id.to_string(),
        original_filename: filename.to_string(),
        description: None,
        original_width: Some(640),
        original_height: Some(360),
        enhanced_width: Some(2560),
        enhanced_height: Some(1440),
        model_type: "anime_video".to_string(),
        scale: Some(4),
        face_enhance: false,
        status: JobStatus::from_wire(status),
        duration_seconds: Some(4.0),
        fps: Some(25.0),
        frame_count: Some(100),
        frames_processed: Some(if status == "completed" { 100 } else { 40 }),
        processing_time_ms: None,
        gpu_used: None,
        created_at: parse_timestamp(created_at).unwrap(),
        completed_at: None,
        error_message: None,
    })
}

pub fn video(id: &str, status: &str, created_at: &str) -> JobRecord {
    video_named(id, &format!("{id}.mp4"), status, created_at)
}

/// `count` completed images with distinct, descending timestamps.
pub fn completed_images(count: usize) -> Vec<JobRecord> {
    (0..count)
        .map(|i| {
            let created_at = format!("2024-03-01T{:02}:{:02}:00Z", 23 - i / 60, 59 - i % 60);
            image(&format!("img{i}"), "completed", &created_at)
        })
        .collect()
}

pub fn detail(record: JobRecord, original: Option<&str>, enhanced: Option<&str>) -> JobDetail {
    JobDetail {
        record,
        original_base64: original.map(str::to_string),
        enhanced_base64: enhanced.map(str::to_string),
    }
}
