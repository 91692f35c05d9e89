//! Catalogue of enhancement profiles offered by the service.

use crate::error::CoreError;

/// Static description of one enhancement profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// Default upscale factor.
    pub scale: u32,
    /// Whether the profile is tuned for video frames.
    pub video_tuned: bool,
}

pub const MODEL_GENERAL_X4: &str = "general_x4";
pub const MODEL_GENERAL_X2: &str = "general_x2";
pub const MODEL_ANIME: &str = "anime";
pub const MODEL_ANIME_VIDEO: &str = "anime_video";
pub const MODEL_GENERAL_V3: &str = "general_v3";

/// Profile used when a submission does not name one.
pub const DEFAULT_MODEL: &str = MODEL_GENERAL_X4;

pub const MODELS: &[ModelInfo] = &[
    ModelInfo { id: MODEL_GENERAL_X4, name: "General 4x", scale: 4, video_tuned: false },
    ModelInfo { id: MODEL_GENERAL_X2, name: "General 2x", scale: 2, video_tuned: false },
    ModelInfo { id: MODEL_ANIME, name: "Anime", scale: 4, video_tuned: false },
    ModelInfo { id: MODEL_ANIME_VIDEO, name: "Anime Video", scale: 4, video_tuned: true },
    ModelInfo { id: MODEL_GENERAL_V3, name: "General V3", scale: 4, video_tuned: false },
];

pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

/// Display name for a model id, or the id itself when unknown.
pub fn model_display_name(id: &str) -> &str {
    find_model(id).map(|m| m.name).unwrap_or(id)
}

/// Validate that a model id is one the service knows.
pub fn validate_model(id: &str) -> Result<&'static ModelInfo, CoreError> {
    find_model(id).ok_or_else(|| {
        let valid: Vec<&str> = MODELS.iter().map(|m| m.id).collect();
        CoreError::Validation(format!(
            "Unknown model type: '{id}'. Valid types: {}",
            valid.join(", ")
        ))
    })
}
