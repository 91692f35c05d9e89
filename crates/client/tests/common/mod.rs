//! Shared helpers for client contract tests.
//!
//! Each test assembles an `axum` router answering with canned JSON and
//! binds it to an ephemeral local port.

#![allow(dead_code)]

use axum::http::HeaderMap;
use axum::Router;
use serde_json::{json, Value};

/// Serve `router` on `127.0.0.1:0` and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    format!("http://{addr}")
}

/// Bearer token carried by a request, if any.
pub fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// An image history item as the service serializes it.
pub fn image_json(id: &str, status: &str, created_at: &str) -> Value {
    let completed = status == "completed";
    json!({
        "id": id,
        "original_filename": format!("{id}.png"),
        "description": "test image",
        "original_width": 320,
        "original_height": 240,
        "enhanced_width": if completed { json!(1280) } else { Value::Null },
        "enhanced_height": if completed { json!(960) } else { Value::Null },
        "model_type": "general_x4",
        "scale": 4,
        "face_enhance": false,
        "status": status,
        "processing_time_ms": if completed { json!(1200) } else { Value::Null },
        "gpu_used": Value::Null,
        "created_at": created_at,
        "completed_at": Value::Null,
        "error_message": Value::Null
    })
}

/// A video history item as the service serializes it.
pub fn video_json(id: &str, status: &str, created_at: &str, frames: (u64, u64)) -> Value {
    json!({
        "id": id,
        "original_filename": format!("{id}.mkv"),
        "original_width": 640,
        "original_height": 360,
        "enhanced_width": Value::Null,
        "enhanced_height": Value::Null,
        "model_type": "anime_video",
        "scale": 4,
        "face_enhance": false,
        "status": status,
        "duration_seconds": 12.5,
        "fps": 24.0,
        "frame_count": frames.0,
        "frames_processed": frames.1,
        "processing_time_ms": Value::Null,
        "gpu_used": Value::Null,
        "created_at": created_at,
        "completed_at": Value::Null,
        "error_message": Value::Null
    })
}
