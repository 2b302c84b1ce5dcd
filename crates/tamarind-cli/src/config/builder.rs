use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::GlobalArgs;
use crate::error::Result;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;
use tamarind::core::api::{API_KEY_ENV, ProxyConfig};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Per-user config file location, e.g. `~/.config/tmr/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("bio", "Tamarind", "tmr").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

pub fn build_config(args: &GlobalArgs) -> Result<AppConfig> {
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => FileConfig::from_file(&path)?,
            None => {
                debug!("No configuration file found, using defaults.");
                FileConfig::default()
            }
        },
    };
    let env_key = std::env::var(API_KEY_ENV).ok();
    Ok(merge(args, file_config, env_key, ProxyConfig::from_env()))
}

/// Applies the layers in order of precedence: command line, environment, file, defaults.
fn merge(
    args: &GlobalArgs,
    file: FileConfig,
    env_key: Option<String>,
    proxy: ProxyConfig,
) -> AppConfig {
    let defaults = DefaultsConfig::default();
    let non_blank = |k: &String| !k.trim().is_empty();

    let api_key = args
        .api_key
        .clone()
        .filter(non_blank)
        .or(env_key.filter(non_blank))
        .or(file.api_key.filter(non_blank));

    AppConfig {
        api_key,
        base_url: args
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or(defaults.base_url),
        proxy,
        request_timeout: file.request_timeout.map(Duration::from_secs),
        poll_interval: Duration::from_secs(
            file.poll_interval.unwrap_or(defaults.poll_interval_secs),
        ),
        max_polls: file.max_polls,
        timeout: file.timeout.map(Duration::from_secs),
        output_folder: file.output_folder.unwrap_or(defaults.output_folder),
    }
}
