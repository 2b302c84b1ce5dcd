use super::cancel::CancelToken;
use super::config::MonitorConfig;
use super::error::{EngineError, Result};
use super::fetch::{FetchOutcome, ResultFetcher};
use super::progress::{Progress, ProgressReporter};
use super::selection::{JobFilter, list_jobs};
use crate::core::api::{JobQuery, JobRecord, JobStatus, TamarindApi};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

const INITIAL_BUDGET: u64 = 5;

/// Open-ended progress estimate for a single job whose duration is unknown: the step counter
/// moves every poll and the budget doubles once two thirds of it are used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEstimate {
    step: u64,
    budget: u64,
}

impl Default for ProgressEstimate {
    fn default() -> Self {
        Self {
            step: 0,
            budget: INITIAL_BUDGET,
        }
    }
}

impl ProgressEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Records one more poll. Returns `true` when the budget was doubled.
    pub fn advance(&mut self) -> bool {
        self.step += 1;
        if self.step * 3 >= self.budget * 2 {
            self.budget *= 2;
            true
        } else {
            false
        }
    }
}

/// Why a monitor loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEnd {
    AllTerminal,
    Cancelled,
    TickLimit,
    TimeLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorReport {
    pub end: MonitorEnd,
    pub ticks: u64,
    /// Job count per status at the last successful poll.
    pub summary: BTreeMap<String, usize>,
    /// Result downloads attempted during this run, in order.
    pub downloads: Vec<(String, FetchOutcome)>,
}

impl MonitorReport {
    fn new() -> Self {
        Self {
            end: MonitorEnd::AllTerminal,
            ticks: 0,
            summary: BTreeMap::new(),
            downloads: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.end == MonitorEnd::AllTerminal
    }

    pub fn count(&self, status: &JobStatus) -> usize {
        self.summary.get(status.as_str()).copied().unwrap_or(0)
    }
}

impl fmt::Display for MonitorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<String> = self
            .summary
            .iter()
            .map(|(status, n)| format!("{}: {}", status, n))
            .collect();
        write!(f, "{{{}}}", counts.join(", "))
    }
}

fn summarize(jobs: &[JobRecord]) -> BTreeMap<String, usize> {
    let mut summary = BTreeMap::new();
    for job in jobs {
        *summary.entry(job.status.as_str().to_string()).or_insert(0) += 1;
    }
    summary
}

/// Jobs followed by [`Monitor::watch_jobs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCriteria {
    pub job_type: Option<String>,
    /// Only these job names, when given.
    pub job_names: Option<BTreeSet<String>>,
    pub expand_batch: bool,
}

impl Default for JobCriteria {
    fn default() -> Self {
        Self {
            job_type: None,
            job_names: None,
            expand_batch: true,
        }
    }
}

/// Polls job status until every followed job is terminal, fetching each completed job once.
pub struct Monitor<'a> {
    api: &'a dyn TamarindApi,
    config: &'a MonitorConfig,
    reporter: &'a ProgressReporter<'a>,
    cancel: CancelToken,
    fetcher: ResultFetcher<'a>,
}

impl<'a> Monitor<'a> {
    pub fn new(
        api: &'a dyn TamarindApi,
        config: &'a MonitorConfig,
        reporter: &'a ProgressReporter<'a>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            api,
            config,
            reporter,
            cancel,
            fetcher: ResultFetcher::new(api),
        }
    }

    /// Follows one job. A job that disappears or is stopped is an error.
    #[instrument(skip_all, name = "monitor_job", fields(job = job_name))]
    pub fn watch_job(&self, job_name: &str) -> Result<MonitorReport> {
        self.reporter.report(Progress::PhaseStart {
            name: "Monitoring job",
        });
        let result = self.watch_job_loop(job_name);
        self.reporter.report(Progress::TaskFinish);
        self.reporter.report(Progress::PhaseFinish);
        result
    }

    fn watch_job_loop(&self, job_name: &str) -> Result<MonitorReport> {
        let started = Instant::now();
        let mut estimate = ProgressEstimate::new();
        let mut report = MonitorReport::new();
        self.reporter.report(Progress::TaskStart {
            total_steps: estimate.budget(),
        });

        loop {
            report.ticks += 1;
            match self.api.list_jobs(&JobQuery::named(job_name)) {
                Err(e) => warn!("Could not fetch status of {}: {}", job_name, e),
                Ok(jobs) => {
                    let Some(job) = jobs.into_iter().next() else {
                        return Err(EngineError::JobMissing(job_name.to_string()));
                    };
                    debug!("Job {} is {}", job_name, job.status);
                    report.summary = summarize(std::slice::from_ref(&job));
                    match job.status {
                        JobStatus::Complete => {
                            if !self.config.skip_download {
                                let outcome =
                                    self.fetcher.fetch(job_name, &self.config.output_folder)?;
                                report.downloads.push((job_name.to_string(), outcome));
                            }
                            self.reporter.report(Progress::TaskPosition {
                                position: estimate.budget(),
                            });
                            self.reporter
                                .report(Progress::Message(format!("Job {} is completed", job_name)));
                            info!("Job {} is completed", job_name);
                            report.end = MonitorEnd::AllTerminal;
                            return Ok(report);
                        }
                        JobStatus::Stopped => {
                            return Err(EngineError::JobStopped(job_name.to_string()));
                        }
                        status => {
                            if estimate.advance() {
                                self.reporter.report(Progress::TaskResize {
                                    total_steps: estimate.budget(),
                                });
                            }
                            self.reporter.report(Progress::TaskIncrement);
                            self.reporter.report(Progress::StatusUpdate {
                                text: status.to_string(),
                            });
                        }
                    }
                }
            }

            if let Some(end) = self.pace(report.ticks, started) {
                report.end = end;
                return Ok(report);
            }
        }
    }

    /// Follows every member of a batch. Stopped members are tolerated.
    #[instrument(skip_all, name = "monitor_batch", fields(batch = batch_name))]
    pub fn watch_batch(&self, batch_name: &str) -> Result<MonitorReport> {
        self.watch_group("Monitoring batch", || {
            self.api.list_batch_jobs(batch_name).map_err(Into::into)
        })
    }

    /// Follows every job matching `criteria`.
    #[instrument(skip_all, name = "monitor_jobs")]
    pub fn watch_jobs(&self, criteria: &JobCriteria) -> Result<MonitorReport> {
        let filter = JobFilter {
            job_type: criteria.job_type.clone(),
            expand_batch: criteria.expand_batch,
            ..JobFilter::all()
        };
        self.watch_group("Monitoring jobs", || {
            let mut jobs = list_jobs(self.api, &filter)?;
            if let Some(names) = &criteria.job_names {
                jobs.retain(|j| names.contains(&j.name));
            }
            Ok(jobs)
        })
    }

    fn watch_group(
        &self,
        phase: &'static str,
        list: impl Fn() -> Result<Vec<JobRecord>>,
    ) -> Result<MonitorReport> {
        self.reporter.report(Progress::PhaseStart { name: phase });
        let result = self.watch_group_loop(list);
        self.reporter.report(Progress::TaskFinish);
        self.reporter.report(Progress::PhaseFinish);
        result
    }

    fn watch_group_loop(
        &self,
        list: impl Fn() -> Result<Vec<JobRecord>>,
    ) -> Result<MonitorReport> {
        let started = Instant::now();
        let mut report = MonitorReport::new();
        let mut downloaded: HashSet<String> = HashSet::new();
        let mut total: Option<usize> = None;

        loop {
            report.ticks += 1;
            match list() {
                Err(EngineError::Api(e)) => warn!("Could not fetch job status: {}", e),
                Err(other) => return Err(other),
                Ok(jobs) => {
                    let n_total = jobs.len();
                    let n_done = jobs.iter().filter(|j| j.status.is_terminal()).count();
                    match total {
                        None => self.reporter.report(Progress::TaskStart {
                            total_steps: n_total as u64,
                        }),
                        Some(previous) if previous != n_total => {
                            self.reporter.report(Progress::TaskResize {
                                total_steps: n_total as u64,
                            })
                        }
                        Some(_) => {}
                    }
                    total = Some(n_total);
                    self.reporter.report(Progress::TaskPosition {
                        position: n_done as u64,
                    });
                    debug!("{} of {} job(s) terminal", n_done, n_total);

                    if !self.config.skip_download {
                        for job in jobs.iter().filter(|j| j.status == JobStatus::Complete) {
                            if downloaded.insert(job.name.clone()) {
                                let outcome = self.fetch_member(&job.name)?;
                                report.downloads.push((job.name.clone(), outcome));
                            }
                        }
                    }

                    report.summary = summarize(&jobs);
                    if n_total > 0 && n_done == n_total {
                        report.end = MonitorEnd::AllTerminal;
                        self.reporter.report(Progress::Message(report.to_string()));
                        info!("All {} job(s) finished: {}", n_total, report);
                        return Ok(report);
                    }
                }
            }

            if let Some(end) = self.pace(report.ticks, started) {
                report.end = end;
                info!("Monitoring stopped early ({:?}): {}", end, report);
                return Ok(report);
            }
        }
    }

    /// Fetches one member of a group. An archive that cannot be unpacked fails only that
    /// member.
    fn fetch_member(&self, job_name: &str) -> Result<FetchOutcome> {
        match self.fetcher.fetch(job_name, &self.config.output_folder) {
            Err(e @ EngineError::Archive { .. }) => {
                warn!("Results of {} are unusable: {}", job_name, e);
                Ok(FetchOutcome::DownloadFailed {
                    reason: e.to_string(),
                })
            }
            other => other,
        }
    }

    /// Checks the loop ceilings, then sleeps until the next poll. Returns why the loop must
    /// stop, if it must.
    fn pace(&self, ticks: u64, started: Instant) -> Option<MonitorEnd> {
        if self.cancel.is_cancelled() {
            return Some(MonitorEnd::Cancelled);
        }
        if self.config.max_ticks.is_some_and(|max| ticks >= max) {
            return Some(MonitorEnd::TickLimit);
        }
        let mut wait = self.config.interval;
        if let Some(max) = self.config.max_elapsed {
            let elapsed = started.elapsed();
            if elapsed >= max {
                return Some(MonitorEnd::TimeLimit);
            }
            wait = wait.min(max - elapsed);
        }
        if self.cancel.wait_timeout(wait) {
            return Some(MonitorEnd::Cancelled);
        }
        None
    }
}
