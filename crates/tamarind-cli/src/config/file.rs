use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Contents of a `config.toml`. Every key is optional.
///
/// ```toml
/// api-key = "..."
/// poll-interval = 30
/// output-folder = "results"
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Seconds between two status checks.
    pub poll_interval: Option<u64>,
    pub max_polls: Option<u64>,
    /// Seconds before a monitor gives up.
    pub timeout: Option<u64>,
    /// Seconds allowed for one HTTP request.
    pub request_timeout: Option<u64>,
    pub output_folder: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
