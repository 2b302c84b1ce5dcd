//! The boundary between the client and the remote Tamarind service.
//!
//! Everything above this module talks to the service through [`TamarindApi`], so the
//! orchestration logic in [`crate::engine`] can be driven by any implementation:
//! [`HttpClient`] in production, scripted fakes in tests.

mod config;
#[cfg(test)]
pub(crate) mod fake;
mod http;
pub mod types;

pub use config::{API_KEY_ENV, ClientConfig, DEFAULT_BASE_URL, ProxyConfig};
pub use http::HttpClient;
pub use types::{
    BatchSubmission, FileQuery, JobQuery, JobRecord, JobStatus, JobSubmission, Settings,
};

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API key not found, please set it with environment variable TAMARIND_API_KEY")]
    MissingApiKey,

    #[error("API key contains characters that cannot be sent in a header")]
    InvalidApiKey,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operations exposed by the remote job service.
///
/// Every method maps onto one endpoint (or one paginated sequence of calls to an endpoint).
/// Implementations report non-success HTTP statuses as [`ApiError::Status`], except for the
/// job listings, which stop paginating and return what they have accumulated so far.
pub trait TamarindApi {
    /// `POST submit-job`. Returns the raw response text.
    fn submit_job(&self, request: &JobSubmission) -> Result<String, ApiError>;

    /// `POST submit-batch`. Returns the raw response text.
    fn submit_batch(&self, request: &BatchSubmission) -> Result<String, ApiError>;

    /// `PUT upload/{remote_name}`, optionally inside `folder`.
    fn upload_file(
        &self,
        local_path: &Path,
        remote_name: &str,
        folder: Option<&str>,
    ) -> Result<(), ApiError>;

    /// `GET jobs`, following `startKey` pagination.
    fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobRecord>, ApiError>;

    /// `GET jobs?batch=...`, following `startKey` pagination.
    fn list_batch_jobs(&self, batch_name: &str) -> Result<Vec<JobRecord>, ApiError>;

    /// `POST delete-job`. Returns the raw response text.
    fn delete_job(&self, job_name: &str) -> Result<String, ApiError>;

    /// `POST result`. Returns the pre-signed archive URL with surrounding quotes removed.
    fn result_url(&self, job_name: &str) -> Result<String, ApiError>;

    /// `GET {url}` for a result archive.
    fn download(&self, url: &str) -> Result<Vec<u8>, ApiError>;

    /// `GET files`.
    fn list_files(&self, query: &FileQuery) -> Result<Vec<String>, ApiError>;

    /// `GET delete-file?filePath=...`.
    fn delete_file(&self, file_path: &str) -> Result<(), ApiError>;

    /// `GET delete-file?folder=...`.
    fn delete_folder(&self, folder: &str) -> Result<(), ApiError>;
}
