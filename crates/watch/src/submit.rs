//! Submission of local files given on the command line.

use std::path::Path;

use enhancer_client::api::{EnhanceApi, Submission};
use enhancer_core::format::{format_dimensions, format_duration, format_processing_time};
use enhancer_core::job::{Dimensions, JobKind};
use enhancer_core::naming::kind_for_filename;

/// Why a path was not submitted.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("path has no usable file name")]
    NoFileName,
    #[error("unsupported file type")]
    Unsupported,
    #[error("could not read file: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// Read `path` into a submission and work out which endpoint takes it.
pub async fn read_submission(
    path: &Path,
    model: &str,
    face_enhance: bool,
) -> Result<(JobKind, Submission), SkipReason> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(SkipReason::NoFileName)?;
    let kind = kind_for_filename(filename).ok_or(SkipReason::Unsupported)?;
    let bytes = tokio::fs::read(path).await?;

    Ok((
        kind,
        Submission {
            filename: filename.to_string(),
            bytes,
            model_type: model.to_string(),
            scale: None,
            face_enhance,
            description: None,
        },
    ))
}

/// Submit every path, logging each outcome. Returns how many were
/// accepted by the service.
pub async fn submit_files<P: AsRef<Path>>(
    api: &EnhanceApi,
    paths: &[P],
    model: &str,
    face_enhance: bool,
) -> usize {
    let mut accepted = 0;

    for path in paths {
        let path = path.as_ref();
        let (kind, submission) = match read_submission(path, model, face_enhance).await {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!(path = %path.display(), reason = %e, "Skipping file");
                continue;
            }
        };

        match kind {
            JobKind::Image => match api.enhance_image(&submission).await {
                Ok(response) => {
                    let image = &response.image.item;
                    tracing::info!(
                        job_id = %image.id,
                        status = %image.status,
                        output = %format_dimensions(Dimensions::from_parts(image.enhanced_width, image.enhanced_height)),
                        processing_time = %format_processing_time(image.processing_time_ms),
                        "Image enhanced",
                    );
                    accepted += 1;
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Image submission failed");
                }
            },
            JobKind::Video => match api.enhance_video(&submission).await {
                Ok(response) => {
                    let video = &response.video;
                    tracing::info!(
                        job_id = %video.id,
                        status = %video.status,
                        duration = %format_duration(video.duration_seconds),
                        frame_count = ?video.frame_count,
                        "Video accepted for enhancement",
                    );
                    accepted += 1;
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Video submission failed");
                }
            },
        }
    }

    accepted
}
