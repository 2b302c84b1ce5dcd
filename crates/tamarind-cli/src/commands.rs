pub mod aggregate;
pub mod delete;
pub mod download;
pub mod files;
pub mod jobs;
pub mod monitor;
pub mod predict;

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use tamarind::core::api::HttpClient;
use tamarind::engine::cancel::CancelToken;
use tracing::{debug, warn};

/// Exit status used when a second Ctrl-C aborts the process.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Runs `work` on the blocking thread pool with a connected HTTP client.
///
/// The first Ctrl-C cancels the token handed to `work`, which stops any monitor loop at its
/// next poll. A second Ctrl-C exits immediately.
pub async fn with_client<T, F>(config: &AppConfig, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&HttpClient, CancelToken) -> Result<T> + Send + 'static,
{
    let client_config = config.client_config()?;
    let cancel = CancelToken::new();

    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            warn!("Interrupted, stopping after the current request. Press Ctrl-C again to abort.");
            cancel.cancel();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })
    };

    let handle = tokio::task::spawn_blocking(move || {
        let client = HttpClient::new(client_config)?;
        debug!("HTTP client ready for {}", client.config().base_url);
        work(&client, cancel)
    });
    let result = handle
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("Worker task failed: {}", e)));
    interrupt.abort();
    result?
}
