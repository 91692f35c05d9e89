//! Record builders shared by the in-crate unit tests.

use enhancer_core::job::{JobKind, JobRecord};
use enhancer_core::status::JobStatus;
use enhancer_core::timestamp::parse_timestamp;
use enhancer_core::wire::{ImageHistoryItem, VideoHistoryItem};

use crate::planner::KindFetch;

pub(crate) fn image(id: &str, status: &str, created_at: &str) -> JobRecord {
    JobRecord::from_image(ImageHistoryItem {
        id: id.to_string(),
        original_filename: format!("{id}.png"),
        description: None,
        original_width: Some(320),
        original_height: Some(240),
        enhanced_width: Some(1280),
        enhanced_height: Some(960),
        model_type: "general_x4".to_string(),
        scale: Some(4),
        face_enhance: false,
        status: JobStatus::from_wire(status),
        processing_time_ms: None,
        gpu_used: None,
        created_at: parse_timestamp(created_at).unwrap(),
        completed_at: None,
        error_message: None,
    })
}

pub(crate) fn video(id: &str, status: &str, created_at: &str, frames: (u64, u64)) -> JobRecord {
    JobRecord::from_video(VideoHistoryItem {
        id: id.to_string(),
        original_filename: format!("{id}.mp4"),
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
        frame_count: Some(frames.0),
        frames_processed: Some(frames.1),
        processing_time_ms: None,
        gpu_used: None,
        created_at: parse_timestamp(created_at).unwrap(),
        completed_at: None,
        error_message: None,
    })
}

pub(crate) fn fetched(kind: JobKind, total: u64, records: Vec<JobRecord>) -> KindFetch {
    KindFetch {
        kind,
        total,
        records,
    }
}
