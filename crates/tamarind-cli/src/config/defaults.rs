use std::path::PathBuf;
use tamarind::core::api::DEFAULT_BASE_URL;
use tamarind::engine::config::DEFAULT_POLL_INTERVAL;

pub struct DefaultsConfig {
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub output_folder: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            output_folder: PathBuf::from("."),
        }
    }
}
