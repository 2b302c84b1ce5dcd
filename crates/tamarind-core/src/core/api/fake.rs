//! Scripted in-memory [`TamarindApi`] used by the engine and workflow tests.

use super::types::{BatchSubmission, FileQuery, JobQuery, JobRecord, JobStatus, JobSubmission};
use super::{ApiError, TamarindApi};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};

pub(crate) fn job(name: &str, status: &str) -> JobRecord {
    JobRecord {
        name: name.to_string(),
        status: JobStatus::from(status),
        job_type: "alphafold".to_string(),
        settings: Value::Null,
        created: Value::Null,
        batch: None,
        score: Value::Null,
    }
}

pub(crate) fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    cursor.into_inner()
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UploadCall {
    pub local_path: PathBuf,
    pub remote_name: String,
    pub folder: Option<String>,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    /// Successive answers to `list_jobs`; the last frame repeats once the script runs out.
    pub job_frames: RefCell<VecDeque<Vec<JobRecord>>>,
    /// Successive answers to `list_batch_jobs`, with the same repeat rule.
    pub batch_frames: RefCell<VecDeque<Vec<JobRecord>>>,
    pub archives: RefCell<HashMap<String, Vec<u8>>>,
    pub missing_results: RefCell<HashSet<String>>,
    pub remote_files: RefCell<Vec<String>>,
    pub reject_submissions: RefCell<Option<String>>,
    /// Folders whose deletion answers 404.
    pub undeletable_folders: RefCell<HashSet<String>>,
    /// Jobs whose deletion answers 404.
    pub undeletable_jobs: RefCell<HashSet<String>>,

    pub submitted_jobs: RefCell<Vec<JobSubmission>>,
    pub submitted_batches: RefCell<Vec<BatchSubmission>>,
    pub uploads: RefCell<Vec<UploadCall>>,
    pub job_queries: RefCell<Vec<JobQuery>>,
    pub result_requests: RefCell<Vec<String>>,
    pub deleted_jobs: RefCell<Vec<String>>,
    pub deleted_files: RefCell<Vec<String>>,
    pub deleted_folders: RefCell<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job_frames(self, frames: Vec<Vec<JobRecord>>) -> Self {
        *self.job_frames.borrow_mut() = frames.into();
        self
    }

    pub fn with_batch_frames(self, frames: Vec<Vec<JobRecord>>) -> Self {
        *self.batch_frames.borrow_mut() = frames.into();
        self
    }

    pub fn with_archive(self, job_name: &str, bytes: Vec<u8>) -> Self {
        self.archives
            .borrow_mut()
            .insert(job_name.to_string(), bytes);
        self
    }

    pub fn submission_calls(&self) -> usize {
        self.submitted_jobs.borrow().len() + self.submitted_batches.borrow().len()
    }

    pub fn result_requests_for(&self, job_name: &str) -> usize {
        self.result_requests
            .borrow()
            .iter()
            .filter(|n| *n == job_name)
            .count()
    }

    fn next_frame(frames: &RefCell<VecDeque<Vec<JobRecord>>>) -> Vec<JobRecord> {
        let mut frames = frames.borrow_mut();
        if frames.len() > 1 {
            frames.pop_front().unwrap_or_default()
        } else {
            frames.front().cloned().unwrap_or_default()
        }
    }

    fn refuse_delete(refused: &RefCell<HashSet<String>>, name: &str) -> Result<(), ApiError> {
        if refused.borrow().contains(name) {
            return Err(ApiError::Status {
                status: 404,
                body: format!("cannot delete {}", name),
            });
        }
        Ok(())
    }

    fn rejected(&self) -> Result<(), ApiError> {
        match self.reject_submissions.borrow().as_ref() {
            Some(body) => Err(ApiError::Status {
                status: 400,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl TamarindApi for FakeApi {
    fn submit_job(&self, request: &JobSubmission) -> Result<String, ApiError> {
        self.rejected()?;
        self.submitted_jobs.borrow_mut().push(request.clone());
        Ok("\"Job submitted\"".to_string())
    }

    fn submit_batch(&self, request: &BatchSubmission) -> Result<String, ApiError> {
        self.rejected()?;
        self.submitted_batches.borrow_mut().push(request.clone());
        Ok("\"Batch submitted\"".to_string())
    }

    fn upload_file(
        &self,
        local_path: &Path,
        remote_name: &str,
        folder: Option<&str>,
    ) -> Result<(), ApiError> {
        self.uploads.borrow_mut().push(UploadCall {
            local_path: local_path.to_path_buf(),
            remote_name: remote_name.to_string(),
            folder: folder.map(str::to_string),
        });
        Ok(())
    }

    fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobRecord>, ApiError> {
        self.job_queries.borrow_mut().push(query.clone());
        let frame = Self::next_frame(&self.job_frames);
        Ok(match &query.job_name {
            Some(name) => frame.into_iter().filter(|j| &j.name == name).collect(),
            None => frame,
        })
    }

    fn list_batch_jobs(&self, _batch_name: &str) -> Result<Vec<JobRecord>, ApiError> {
        Ok(Self::next_frame(&self.batch_frames))
    }

    fn delete_job(&self, job_name: &str) -> Result<String, ApiError> {
        Self::refuse_delete(&self.undeletable_jobs, job_name)?;
        self.deleted_jobs.borrow_mut().push(job_name.to_string());
        Ok(String::new())
    }

    fn result_url(&self, job_name: &str) -> Result<String, ApiError> {
        self.result_requests.borrow_mut().push(job_name.to_string());
        if self.missing_results.borrow().contains(job_name) {
            return Err(ApiError::Status {
                status: 404,
                body: "no result".to_string(),
            });
        }
        Ok(format!("mem://{}", job_name))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let name = url.trim_start_matches("mem://");
        self.archives
            .borrow()
            .get(name)
            .cloned()
            .ok_or(ApiError::Status {
                status: 403,
                body: "expired".to_string(),
            })
    }

    fn list_files(&self, query: &FileQuery) -> Result<Vec<String>, ApiError> {
        let files = self.remote_files.borrow();
        Ok(match &query.folder {
            Some(folder) => files
                .iter()
                .filter(|f| f.starts_with(&format!("{}/", folder)))
                .cloned()
                .collect(),
            None => files.clone(),
        })
    }

    fn delete_file(&self, file_path: &str) -> Result<(), ApiError> {
        self.deleted_files.borrow_mut().push(file_path.to_string());
        Ok(())
    }

    fn delete_folder(&self, folder: &str) -> Result<(), ApiError> {
        Self::refuse_delete(&self.undeletable_folders, folder)?;
        self.deleted_folders.borrow_mut().push(folder.to_string());
        Ok(())
    }
}
