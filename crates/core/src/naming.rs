//! Artifact filename and MIME conventions.
//!
//! Enhanced artifacts are saved as `{stem}_enhanced{.ext}`; the MIME
//! type is derived from the extension through a fixed table.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;
use crate::job::JobKind;

/// Suffix inserted before the extension of enhanced artifacts.
pub const ENHANCED_SUFFIX: &str = "_enhanced";

/// Fallback MIME type for unknown extensions.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Extension → MIME type lookup (lowercase extensions).
const MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("mp4", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
];

/// Extensions the service accepts as image submissions.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp", "gif"];

/// Extensions the service accepts as video submissions.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v"];

/// Which payload of a completed job to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactVariant {
    Original,
    Enhanced,
}

impl ArtifactVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for ArtifactVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "enhanced" => Ok(Self::Enhanced),
            other => Err(CoreError::Validation(format!(
                "Unknown artifact variant: '{other}'. Valid variants: original, enhanced"
            ))),
        }
    }
}

/// Insert [`ENHANCED_SUFFIX`] before the last extension.
///
/// ```
/// use enhancer_core::naming::enhanced_filename;
///
/// assert_eq!(enhanced_filename("photo.png"), "photo_enhanced.png");
/// assert_eq!(enhanced_filename("README"), "README_enhanced");
/// ```
pub fn enhanced_filename(original: &str) -> String {
    match original.rfind('.') {
        Some(dot) => {
            let (stem, ext) = original.split_at(dot);
            format!("{stem}{ENHANCED_SUFFIX}{ext}")
        }
        None => format!("{original}{ENHANCED_SUFFIX}"),
    }
}

/// Filename to save `variant` of a job submitted as `original`.
pub fn artifact_filename(original: &str, variant: ArtifactVariant) -> String {
    match variant {
        ArtifactVariant::Original => original.to_string(),
        ArtifactVariant::Enhanced => enhanced_filename(original),
    }
}

/// Lowercase extension after the last dot, if any.
fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// MIME type for `filename`, falling back to [`DEFAULT_MIME_TYPE`].
pub fn mime_type_for(filename: &str) -> &'static str {
    let Some(ext) = extension(filename) else {
        return DEFAULT_MIME_TYPE;
    };
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Infer the submission endpoint for a local file from its extension.
pub fn kind_for_filename(filename: &str) -> Option<JobKind> {
    let ext = extension(filename)?;
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(JobKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(JobKind::Video)
    } else {
        None
    }
}
