use std::path::PathBuf;
use std::time::Duration;

use enhancer_client::config::{env_opt, env_parse, ClientConfig, ConfigError};
use enhancer_core::filter::HistoryFilter;
use enhancer_core::models::{validate_model, DEFAULT_MODEL};
use enhancer_sync::poller::DEFAULT_POLL_INTERVAL;

/// Watcher configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub client: ClientConfig,
    /// Credentials to log in with before watching.
    pub email: Option<String>,
    pub password: Option<String>,
    pub filter: HistoryFilter,
    pub poll_interval: Duration,
    /// Pages per kind to keep loaded.
    pub pages: u32,
    /// Where enhanced outputs of finished jobs are saved. Unset disables
    /// downloads.
    pub download_dir: Option<PathBuf>,
    /// Model for submitted files.
    pub model: String,
    pub face_enhance: bool,
    /// Stop once a cycle shows no active job.
    pub exit_when_idle: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            email: None,
            password: None,
            filter: HistoryFilter::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            pages: 1,
            download_dir: None,
            model: DEFAULT_MODEL.to_string(),
            face_enhance: false,
            exit_when_idle: true,
        }
    }
}

impl WatchConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default      |
    /// |-------------------------------|--------------|
    /// | `ENHANCER_EMAIL`              | unset        |
    /// | `ENHANCER_PASSWORD`           | unset        |
    /// | `ENHANCER_FILTER`             | `all`        |
    /// | `ENHANCER_POLL_INTERVAL_SECS` | `5`          |
    /// | `ENHANCER_PAGES`              | `1`          |
    /// | `ENHANCER_DOWNLOAD_DIR`       | unset        |
    /// | `ENHANCER_MODEL`              | `general_x4` |
    /// | `ENHANCER_FACE_ENHANCE`       | `false`      |
    /// | `ENHANCER_EXIT_WHEN_IDLE`     | `true`       |
    ///
    /// Client settings are read by [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let client = ClientConfig::from_env()?;

        let poll_interval_secs: u64 =
            env_parse("ENHANCER_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL.as_secs())?;
        let pages: u32 = env_parse("ENHANCER_PAGES", 1)?;
        let model = env_opt("ENHANCER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let config = Self {
            client,
            email: env_opt("ENHANCER_EMAIL"),
            password: env_opt("ENHANCER_PASSWORD"),
            filter: env_parse("ENHANCER_FILTER", HistoryFilter::default())?,
            poll_interval: Duration::from_secs(poll_interval_secs),
            pages,
            download_dir: env_opt("ENHANCER_DOWNLOAD_DIR").map(PathBuf::from),
            model,
            face_enhance: env_parse("ENHANCER_FACE_ENHANCE", false)?,
            exit_when_idle: env_parse("ENHANCER_EXIT_WHEN_IDLE", true)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "ENHANCER_POLL_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.pages == 0 {
            return Err(ConfigError::Invalid {
                var: "ENHANCER_PAGES",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        validate_model(&self.model).map_err(|e| ConfigError::Invalid {
            var: "ENHANCER_MODEL",
            value: self.model.clone(),
            reason: e.to_string(),
        })?;
        if self.email.is_some() != self.password.is_some() {
            return Err(ConfigError::Invalid {
                var: "ENHANCER_PASSWORD",
                value: String::new(),
                reason: "ENHANCER_EMAIL and ENHANCER_PASSWORD must be set together".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.filter, HistoryFilter::All);
        assert!(config.exit_when_idle);
        assert_eq!(config.credentials(), None);
    }

    #[test]
    fn rejects_zero_pages_and_interval() {
        let config = WatchConfig {
            pages: 0,
            ..WatchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = WatchConfig {
            poll_interval: Duration::ZERO,
            ..WatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_model() {
        let config = WatchConfig {
            model: "ultra_x16".into(),
            ..WatchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().starts_with("ENHANCER_MODEL has invalid value 'ultra_x16'"));
    }

    #[test]
    fn credentials_need_both_halves() {
        let half = WatchConfig {
            email: Some("ana@example.com".into()),
            ..WatchConfig::default()
        };
        assert!(half.validate().is_err());
        assert_eq!(half.credentials(), None);

        let full = WatchConfig {
            password: Some("secret".into()),
            ..half
        };
        assert!(full.validate().is_ok());
        assert_eq!(full.credentials(), Some(("ana@example.com", "secret")));
    }
}
