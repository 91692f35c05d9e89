//! History view filter and pagination constants.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;
use crate::job::JobKind;

/// Items requested per page and per kind.
pub const PAGE_SIZE: u32 = 20;

/// Largest `per_page` the service honours.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Which job collections the history view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFilter {
    #[default]
    All,
    Images,
    Videos,
}

impl HistoryFilter {
    /// Kinds that must be queried for this filter.
    pub fn kinds(self) -> &'static [JobKind] {
        match self {
            Self::All => &JobKind::ALL,
            Self::Images => &[JobKind::Image],
            Self::Videos => &[JobKind::Video],
        }
    }

    pub fn includes(self, kind: JobKind) -> bool {
        self.kinds().contains(&kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Images => "images",
            Self::Videos => "videos",
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "images" | "image" => Ok(Self::Images),
            "videos" | "video" => Ok(Self::Videos),
            other => Err(CoreError::Validation(format!(
                "Unknown history filter: '{other}'. Valid filters: all, images, videos"
            ))),
        }
    }
}

/// Validate a 1-indexed page number.
pub fn validate_page(page: u32) -> Result<(), CoreError> {
    if page == 0 {
        return Err(CoreError::Validation("Page numbers start at 1".to_string()));
    }
    Ok(())
}

/// Validate a page size against the service limits.
pub fn validate_per_page(per_page: u32) -> Result<(), CoreError> {
    if per_page == 0 || per_page > MAX_PAGE_SIZE {
        return Err(CoreError::Validation(format!(
            "per_page must be between 1 and {MAX_PAGE_SIZE}, got {per_page}"
        )));
    }
    Ok(())
}
