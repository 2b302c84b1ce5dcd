use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Options sent with one job, keyed by the option names of the remote API.
pub type Settings = Map<String, Value>;

/// The job type the service uses for batch container entries.
pub const BATCH_TYPE: &str = "batch";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    Running,
    Complete,
    Stopped,
    Other(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Stopped)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Running => "Running",
            JobStatus::Complete => "Complete",
            JobStatus::Stopped => "Stopped",
            JobStatus::Other(s) => s,
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Queued" => JobStatus::Queued,
            "Running" => JobStatus::Running,
            "Complete" => JobStatus::Complete,
            "Stopped" => JobStatus::Stopped,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        JobStatus::from(s.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the `jobs` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "JobName")]
    pub name: String,
    #[serde(rename = "JobStatus")]
    pub status: JobStatus,
    #[serde(rename = "Type", default)]
    pub job_type: String,
    #[serde(rename = "Settings", default)]
    pub settings: Value,
    #[serde(rename = "Created", default)]
    pub created: Value,
    #[serde(rename = "Batch", default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    #[serde(rename = "Score", default, skip_serializing_if = "Value::is_null")]
    pub score: Value,
}

impl JobRecord {
    pub fn is_batch(&self) -> bool {
        self.job_type == BATCH_TYPE
    }

    /// The model behind this entry. Batch entries carry their model name in `Settings`.
    pub fn model(&self) -> &str {
        if self.is_batch() {
            self.settings.as_str().unwrap_or_default()
        } else {
            &self.job_type
        }
    }
}

/// One page of a `jobs` response, which comes either as `{jobs: [...], startKey?}`
/// or as a single `{"0": {...}}` object.
#[derive(Debug, Default, PartialEq)]
pub struct JobsPage {
    pub jobs: Vec<JobRecord>,
    pub start_key: Option<String>,
}

impl JobsPage {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut obj) = value else {
            return Ok(Self::default());
        };

        let mut jobs = Vec::new();
        if let Some(list) = obj.remove("jobs") {
            jobs = serde_json::from_value(list)?;
        } else if let Some(single) = obj.remove("0") {
            jobs.push(serde_json::from_value(single)?);
        }

        let start_key = match obj.remove("startKey") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        Ok(Self { jobs, start_key })
    }
}

/// Raw query parameters accepted by `GET jobs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    pub job_name: Option<String>,
    pub organization: bool,
    pub include_subjobs: bool,
}

impl JobQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            job_name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Raw query parameters accepted by `GET files`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub folder: Option<String>,
    pub include_folders: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub job_name: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSubmission {
    pub batch_name: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub settings: Vec<Settings>,
    pub job_names: Vec<String>,
}

impl BatchSubmission {
    pub fn push(&mut self, job_name: impl Into<String>, settings: Settings) {
        self.job_names.push(job_name.into());
        self.settings.push(settings);
    }
}
