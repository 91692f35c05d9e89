use enhancer_core::error::CoreError;

/// Errors from the enhancement REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum EnhanceApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Enhancement API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The service's `error` field, or the raw body.
        message: String,
    },

    /// No usable session: missing token, or the refresh was rejected.
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    /// The request was rejected locally before being sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

impl EnhanceApiError {
    /// Transport failures and server-side (5xx) errors may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Unauthorized(_) | Self::Invalid(_) => false,
        }
    }

    /// HTTP status, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Invalid(_) => None,
        }
    }
}
