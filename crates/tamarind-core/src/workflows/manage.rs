use crate::core::api::{FileQuery, JobQuery, JobRecord, TamarindApi};
use crate::engine::error::{EngineError, Result};
use crate::engine::fetch::{FetchOutcome, ResultFetcher};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::selection::{self, JobFilter};
use rand::Rng;
use std::path::Path;
use tracing::{info, instrument, warn};

const NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NAME_LENGTH: usize = 6;

/// Housekeeping operations on the jobs and files of one account.
pub struct JobManager<'a> {
    api: &'a dyn TamarindApi,
}

impl<'a> JobManager<'a> {
    pub fn new(api: &'a dyn TamarindApi) -> Self {
        Self { api }
    }

    /// A random 6-character `[a-z0-9]` name that no job uses yet.
    pub fn generate_job_name(&self) -> Result<String> {
        let mut rng = rand::thread_rng();
        loop {
            let name: String = (0..NAME_LENGTH)
                .map(|_| NAME_CHARSET[rng.gen_range(0..NAME_CHARSET.len())] as char)
                .collect();
            if !self.job_exists(&name)? {
                return Ok(name);
            }
        }
    }

    pub fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRecord>> {
        selection::list_jobs(self.api, filter)
    }

    pub fn job_exists(&self, name: &str) -> Result<bool> {
        Ok(!self.api.list_jobs(&JobQuery::named(name))?.is_empty())
    }

    /// Whether `name` is a batch rather than a single job.
    pub fn is_batch(&self, name: &str) -> Result<bool> {
        self.api
            .list_jobs(&JobQuery::named(name))?
            .first()
            .map(JobRecord::is_batch)
            .ok_or_else(|| EngineError::JobNotFound(name.to_string()))
    }

    pub fn delete_job(&self, name: &str) -> Result<String> {
        let body = self.api.delete_job(name)?;
        info!("Job deleted: {}", name);
        Ok(body)
    }

    /// Deletes the uploaded folder of a batch, each of its jobs, then the batch itself.
    ///
    /// A batch submitted without templates has no folder, so a failed folder deletion is
    /// only logged.
    #[instrument(skip(self))]
    pub fn delete_batch(&self, batch_name: &str) -> Result<()> {
        let members = self.api.list_batch_jobs(batch_name)?;
        if let Err(e) = self.delete_folder(batch_name) {
            warn!("Could not delete folder of batch {}: {}", batch_name, e);
        }
        for job in &members {
            self.delete_job(&job.name)?;
        }
        self.delete_job(batch_name)?;
        info!("Batch deleted: {}", batch_name);
        Ok(())
    }

    /// Deletes every job and batch matching `filter`. Returns the jobs still listed
    /// afterwards; an empty list means everything was deleted.
    ///
    /// A failed deletion is logged and the remaining jobs are still attempted.
    #[instrument(skip(self))]
    pub fn delete_all_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRecord>> {
        let filter = JobFilter {
            expand_batch: false,
            ..filter.clone()
        };
        for job in self.list_jobs(&filter)? {
            let deleted = if job.is_batch() {
                self.delete_batch(&job.name)
            } else {
                self.delete_job(&job.name).map(|_| ())
            };
            if let Err(e) = deleted {
                warn!("Could not delete {}: {}", job.name, e);
            }
        }

        let leftovers = self.list_jobs(&filter)?;
        if leftovers.is_empty() {
            info!("All jobs have been deleted successfully.");
        } else {
            let sample: Vec<&str> = leftovers.iter().take(5).map(|j| j.name.as_str()).collect();
            warn!(
                "{} jobs cannot be deleted: {}",
                leftovers.len(),
                sample.join(", ")
            );
        }
        Ok(leftovers)
    }

    /// Uploaded files, optionally restricted to one folder.
    pub fn list_files(&self, folder: Option<&str>) -> Result<Vec<String>> {
        Ok(self.api.list_files(&FileQuery {
            folder: folder.map(str::to_string),
            include_folders: false,
        })?)
    }

    /// Every uploaded file and folder. Folder entries end with `/`.
    pub fn list_all_files(&self) -> Result<Vec<String>> {
        Ok(self.api.list_files(&FileQuery {
            folder: None,
            include_folders: true,
        })?)
    }

    pub fn delete_file(&self, path: &str) -> Result<()> {
        self.api.delete_file(path)?;
        info!("File deleted: {}", path);
        Ok(())
    }

    pub fn delete_folder(&self, folder: &str) -> Result<()> {
        self.api.delete_folder(folder)?;
        info!("Folder deleted: {}", folder);
        Ok(())
    }

    pub fn delete_all_files(&self) -> Result<()> {
        for entry in self.list_all_files()? {
            match entry.strip_suffix('/') {
                Some(folder) => self.delete_folder(folder)?,
                None => self.delete_file(&entry)?,
            }
        }
        Ok(())
    }

    pub fn download(&self, job_name: &str, output_folder: &Path) -> Result<FetchOutcome> {
        ResultFetcher::new(self.api).fetch(job_name, output_folder)
    }

    /// Downloads every job of a batch into `output_folder/<batch_name>`.
    #[instrument(skip(self, reporter))]
    pub fn download_batch(
        &self,
        batch_name: &str,
        output_folder: &Path,
        reporter: &ProgressReporter,
    ) -> Result<Vec<(String, FetchOutcome)>> {
        let jobs = self.api.list_batch_jobs(batch_name)?;
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        let target = output_folder.join(batch_name);
        let fetcher = ResultFetcher::new(self.api);

        reporter.report(Progress::PhaseStart {
            name: "Downloading results",
        });
        reporter.report(Progress::TaskStart {
            total_steps: jobs.len() as u64,
        });
        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let outcome = fetcher.fetch(&job.name, &target)?;
            reporter.report(Progress::TaskIncrement);
            outcomes.push((job.name.clone(), outcome));
        }
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);
        Ok(outcomes)
    }
}
