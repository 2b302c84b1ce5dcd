use super::error::{EngineError, Result};
use crate::core::api::TamarindApi;
use crate::core::io::archive::extract_zip;
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static BATCH_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^-]+-").unwrap());

const ARCHIVE_NAME: &str = "result.zip";

/// How a result download ended. Remote failures are reported here instead of as errors so
/// that one missing archive does not stop a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Extracted { directory: PathBuf },
    UrlUnavailable { reason: String },
    DownloadFailed { reason: String },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Extracted { .. })
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Extracted { directory } => write!(
                f,
                "Downloaded and unpacked results into: {}",
                directory.display()
            ),
            FetchOutcome::UrlUnavailable { reason } => {
                write!(f, "Failed to retrieve results URL: {}", reason)
            }
            FetchOutcome::DownloadFailed { reason } => {
                write!(f, "Failed to download results: {}", reason)
            }
        }
    }
}

/// Drops the `<batch>-` prefixes the service adds to job names reused across batches.
pub fn strip_batch_prefix(job_name: &str) -> String {
    let stripped = BATCH_PREFIX.replace_all(job_name, "");
    if stripped.is_empty() {
        job_name.to_string()
    } else {
        stripped.into_owned()
    }
}

pub struct ResultFetcher<'a> {
    api: &'a dyn TamarindApi,
}

impl<'a> ResultFetcher<'a> {
    pub fn new(api: &'a dyn TamarindApi) -> Self {
        Self { api }
    }

    /// Downloads the result archive of `job_name` and unpacks it into
    /// `output_folder/<job name without batch prefix>`.
    pub fn fetch(&self, job_name: &str, output_folder: &Path) -> Result<FetchOutcome> {
        let url = match self.api.result_url(job_name) {
            Ok(url) => url,
            Err(e) => {
                warn!("No result URL for {}: {}", job_name, e);
                return Ok(FetchOutcome::UrlUnavailable {
                    reason: e.to_string(),
                });
            }
        };
        debug!("Result URL for {}: {}", job_name, url);

        let bytes = match self.api.download(&url) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Downloading results of {} failed: {}", job_name, e);
                return Ok(FetchOutcome::DownloadFailed {
                    reason: e.to_string(),
                });
            }
        };

        let directory = output_folder.join(strip_batch_prefix(job_name));
        fs::create_dir_all(&directory)?;
        let archive = directory.join(ARCHIVE_NAME);
        fs::write(&archive, &bytes)?;
        extract_zip(&archive, &directory).map_err(|source| EngineError::Archive {
            path: archive.clone(),
            source,
        })?;
        fs::remove_file(&archive)?;

        let outcome = FetchOutcome::Extracted { directory };
        info!("{}", outcome);
        Ok(outcome)
    }
}
