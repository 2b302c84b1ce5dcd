use super::error::{EngineError, Result};
use crate::core::api::{ApiError, BatchSubmission, JobSubmission, Settings, TamarindApi};
use crate::core::models::ModelSpec;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// The model's defaults with `overrides` applied key by key.
pub fn merge_settings(model: &dyn ModelSpec, overrides: Option<&Settings>) -> Settings {
    let mut settings = model.default_options();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            settings.insert(key.clone(), value.clone());
        }
    }
    settings
}

/// Parses user-supplied overrides. Anything but a JSON object is rejected.
pub fn parse_settings(text: &str) -> Result<Settings> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(EngineError::InvalidSettings(text.to_string())),
    }
}

/// Every name that appears more than once, each reported once, ordered by where its
/// first repeat occurs.
pub fn find_duplicates<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for name in names {
        let name = name.as_ref();
        let count = seen.entry(name).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(name.to_string());
        }
    }
    duplicates
}

pub fn check_unique_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let names = find_duplicates(names);
    if names.is_empty() {
        Ok(())
    } else {
        Err(EngineError::DuplicateNames { names })
    }
}

pub struct Submitter<'a> {
    api: &'a dyn TamarindApi,
}

impl<'a> Submitter<'a> {
    pub fn new(api: &'a dyn TamarindApi) -> Self {
        Self { api }
    }

    pub fn submit_job(&self, job_name: &str, job_type: &str, settings: Settings) -> Result<String> {
        let request = JobSubmission {
            job_name: job_name.to_string(),
            job_type: job_type.to_string(),
            settings,
        };
        debug!(?request, "Submitting job");
        let body = self
            .api
            .submit_job(&request)
            .map_err(|e| rejected(job_name, e))?;
        info!("Job {} submitted", job_name);
        debug!("Response: {}", body);
        Ok(body)
    }

    /// Submits `request` as one batch. `batch_name` and `job_type` replace whatever the
    /// request carried; the member names must be unique.
    pub fn submit_batch(
        &self,
        batch_name: &str,
        job_type: &str,
        mut request: BatchSubmission,
    ) -> Result<String> {
        check_unique_names(&request.job_names)?;
        request.batch_name = batch_name.to_string();
        request.job_type = job_type.to_string();
        debug!(?request, "Submitting batch");
        let body = self
            .api
            .submit_batch(&request)
            .map_err(|e| rejected(batch_name, e))?;
        info!(
            "Batch {} submitted with {} job(s)",
            batch_name,
            request.job_names.len()
        );
        debug!("Response: {}", body);
        Ok(body)
    }
}

fn rejected(name: &str, error: ApiError) -> EngineError {
    match error {
        ApiError::Status { body, .. } => EngineError::Submission {
            name: name.to_string(),
            body,
        },
        other => other.into(),
    }
}
