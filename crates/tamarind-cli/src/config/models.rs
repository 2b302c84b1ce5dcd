use crate::cli::PollArgs;
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tamarind::core::api::{ApiError, ClientConfig, ProxyConfig};
use tamarind::engine::config::{MonitorConfig, MonitorConfigBuilder};

/// Settings resolved from defaults, the config file, the environment and the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub proxy: ProxyConfig,
    pub request_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub max_polls: Option<u64>,
    pub timeout: Option<Duration>,
    pub output_folder: PathBuf,
}

impl AppConfig {
    /// The HTTP client configuration. Fails when no API key was found anywhere.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let key = self.api_key.clone().ok_or(ApiError::MissingApiKey)?;
        let mut config = ClientConfig::new(key)
            .with_base_url(self.base_url.clone())
            .with_proxy(self.proxy.clone());
        if let Some(timeout) = self.request_timeout {
            config = config.with_timeout(timeout);
        }
        Ok(config)
    }

    /// Monitor settings for one command, with its own polling flags taking precedence.
    pub fn monitor_config(
        &self,
        poll: &PollArgs,
        output: Option<&Path>,
        skip_download: bool,
    ) -> Result<MonitorConfig> {
        let interval = poll
            .interval
            .map(Duration::from_secs)
            .unwrap_or(self.poll_interval);
        let mut builder = MonitorConfigBuilder::new()
            .interval(interval)
            .skip_download(skip_download)
            .output_folder(self.output_folder(output));
        if let Some(ticks) = poll.max_polls.or(self.max_polls) {
            builder = builder.max_ticks(ticks);
        }
        if let Some(elapsed) = poll.timeout.map(Duration::from_secs).or(self.timeout) {
            builder = builder.max_elapsed(elapsed);
        }
        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn output_folder(&self, output: Option<&Path>) -> PathBuf {
        output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output_folder.clone())
    }
}
