use std::str::FromStr;

/// Default service address for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8888";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// A configuration variable was present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the enhancement service, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Pre-issued access token, if any.
    pub access_token: Option<String>,
    /// Refresh token paired with `access_token`.
    pub refresh_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            access_token: None,
            refresh_token: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `ENHANCER_API_URL`              | `http://localhost:8888` |
    /// | `ENHANCER_REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `ENHANCER_ACCESS_TOKEN`         | unset                   |
    /// | `ENHANCER_REFRESH_TOKEN`        | unset                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("ENHANCER_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "ENHANCER_API_URL",
                value: api_url,
                reason: "must start with http:// or https://".into(),
            });
        }

        let request_timeout_secs =
            env_parse("ENHANCER_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            api_url,
            request_timeout_secs,
            access_token: env_opt("ENHANCER_ACCESS_TOKEN"),
            refresh_token: env_opt("ENHANCER_REFRESH_TOKEN"),
        })
    }
}

/// Read a non-empty variable.
pub fn env_opt(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset.
pub fn env_parse<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(var) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
