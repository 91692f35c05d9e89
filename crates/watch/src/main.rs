//! `enhancer-watch` -- follow image and video enhancement jobs.
//!
//! Optionally logs in and submits the files given as arguments, then
//! polls the job history until no job is pending or processing (or until
//! Ctrl-C), saving the enhanced output of every job that finishes.
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default                 | Description                          |
//! |---------------------------------|----------|-------------------------|--------------------------------------|
//! | `ENHANCER_API_URL`              | no       | `http://localhost:8888` | Service base URL                     |
//! | `ENHANCER_REQUEST_TIMEOUT_SECS` | no       | `30`                    | Per-request timeout                  |
//! | `ENHANCER_ACCESS_TOKEN`         | no       | --                      | Pre-issued access token              |
//! | `ENHANCER_REFRESH_TOKEN`        | no       | --                      | Refresh token for the access token   |
//! | `ENHANCER_EMAIL`                | no       | --                      | Log in with this account             |
//! | `ENHANCER_PASSWORD`             | no       | --                      | Password for `ENHANCER_EMAIL`        |
//! | `ENHANCER_FILTER`               | no       | `all`                   | `all`, `images` or `videos`          |
//! | `ENHANCER_POLL_INTERVAL_SECS`   | no       | `5`                     | Seconds between refreshes            |
//! | `ENHANCER_PAGES`                | no       | `1`                     | Pages of history to keep loaded      |
//! | `ENHANCER_DOWNLOAD_DIR`         | no       | --                      | Save finished outputs here           |
//! | `ENHANCER_MODEL`                | no       | `general_x4`            | Model for submitted files            |
//! | `ENHANCER_FACE_ENHANCE`         | no       | `false`                 | Face enhancement for submitted files |
//! | `ENHANCER_EXIT_WHEN_IDLE`       | no       | `true`                  | Exit once nothing is running         |

use std::path::PathBuf;
use std::sync::Arc;

use enhancer_client::api::EnhanceApi;
use enhancer_watch::config::WatchConfig;
use enhancer_watch::{runner, submit};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enhancer_watch=info,enhancer_sync=info,enhancer_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WatchConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let api = EnhanceApi::from_config(&config.client).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });
    let api = Arc::new(api);

    tracing::info!(
        api_url = %api.api_url(),
        filter = %config.filter,
        poll_interval_secs = config.poll_interval.as_secs(),
        "Starting enhancer-watch",
    );

    if let Some((email, password)) = config.credentials() {
        if let Err(e) = api.login(email, password).await {
            tracing::error!(error = %e, "Login failed");
            std::process::exit(1);
        }
    }

    let files: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if !files.is_empty() {
        let accepted = submit::submit_files(&api, &files, &config.model, config.face_enhance).await;
        tracing::info!(submitted = files.len(), accepted, "Submissions sent");
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Interrupted, shutting down");
                    cancel.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "Ctrl-C handler unavailable"),
            }
        }
    });

    runner::watch(api, &config, &cancel).await;
}
