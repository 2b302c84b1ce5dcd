use super::manage::JobManager;
use crate::core::api::{BatchSubmission, Settings, TamarindApi};
use crate::core::io::table::ResultTable;
use crate::core::models::ModelSpec;
use crate::engine::aggregate::aggregate;
use crate::engine::cancel::CancelToken;
use crate::engine::config::MonitorConfig;
use crate::engine::error::Result;
use crate::engine::monitor::{Monitor, MonitorReport};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::submit::{Submitter, check_unique_names, merge_settings};
use crate::engine::templates::{TemplateResolver, TemplateSpec};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// One sequence to predict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub sequence: String,
    /// `;`-separated template files for this entry.
    pub templates: Option<String>,
}

impl Entry {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            templates: None,
        }
    }

    pub fn with_templates(mut self, templates: impl Into<String>) -> Self {
        self.templates = Some(templates.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Job,
    Batch,
}

/// What a prediction left behind.
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub kind: SubmissionKind,
    pub output_folder: PathBuf,
    /// Set when the run waited for the jobs.
    pub report: Option<MonitorReport>,
    /// The merged metrics table, for batches that were waited for.
    pub results: Option<ResultTable>,
}

impl Submission {
    pub fn is_finished(&self) -> bool {
        self.report.as_ref().is_some_and(MonitorReport::is_complete)
    }

    /// Follow-up instructions for the user.
    pub fn notice(&self) -> String {
        let out = self.output_folder.display();
        if self.is_finished() {
            format!(
                "Job completed, outputs in {out}.\nPlease delete the batch with:\n    tmr delete {}",
                self.name
            )
        } else {
            format!(
                "Job submitted as: {name}.\n\
                 To monitor the progress:\n    tmr monitor {name}\n\
                 When completed, download results with:\n    tmr download -o {out} {name}\n\
                 To delete the batch:\n    tmr delete {name}",
                name = self.name
            )
        }
    }
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notice())
    }
}

/// Runs predictions of one model end to end.
pub struct Predictor<'a> {
    api: &'a dyn TamarindApi,
    model: &'a dyn ModelSpec,
    reporter: &'a ProgressReporter<'a>,
    cancel: CancelToken,
    monitor_config: MonitorConfig,
}

impl<'a> Predictor<'a> {
    pub fn new(
        api: &'a dyn TamarindApi,
        model: &'a dyn ModelSpec,
        reporter: &'a ProgressReporter<'a>,
        monitor_config: MonitorConfig,
    ) -> Self {
        Self {
            api,
            model,
            reporter,
            cancel: CancelToken::new(),
            monitor_config,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Submits one job. A name is generated when none is given.
    #[instrument(skip_all, name = "predict_job", fields(model = self.model.job_type()))]
    pub fn run(
        &self,
        name: Option<&str>,
        sequence: &str,
        templates: Option<&str>,
        overrides: Option<&Settings>,
        wait: bool,
    ) -> Result<Submission> {
        let name = match name {
            Some(name) => name.to_string(),
            None => JobManager::new(self.api).generate_job_name()?,
        };

        self.reporter.report(Progress::PhaseStart { name: "Submission" });
        let mut settings = merge_settings(self.model, overrides);
        settings.insert("sequence".into(), Value::String(sequence.to_string()));
        if let Some(templates) = templates.filter(|t| self.accepts_templates(t)) {
            let refs = TemplateResolver::new(self.api).resolve(
                std::slice::from_ref(&name),
                &TemplateSpec::Shared(templates.to_string()),
                None,
            )?;
            if let Some(refs) = refs.first() {
                self.model.apply_templates(&mut settings, refs);
            }
        }
        Submitter::new(self.api).submit_job(&name, self.model.job_type(), settings)?;
        self.reporter.report(Progress::PhaseFinish);

        let mut submission = Submission {
            name,
            kind: SubmissionKind::Job,
            output_folder: self.monitor_config.output_folder.clone(),
            report: None,
            results: None,
        };
        if wait {
            info!("Waiting for job {}", submission.name);
            submission.report = Some(self.monitor().watch_job(&submission.name)?);
        }
        Ok(submission)
    }

    /// Submits every entry as one batch. A batch name is generated when none is given.
    ///
    /// When waiting, the batch is monitored and the per-job metrics are merged into
    /// `results.csv` once every job has finished.
    #[instrument(skip_all, name = "predict_batch", fields(model = self.model.job_type(), entries = entries.len()))]
    pub fn batch(
        &self,
        batch_name: Option<&str>,
        entries: &[Entry],
        overrides: Option<&Settings>,
        wait: bool,
    ) -> Result<Submission> {
        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        check_unique_names(&names)?;
        let batch_name = match batch_name {
            Some(name) => name.to_string(),
            None => JobManager::new(self.api).generate_job_name()?,
        };

        self.reporter.report(Progress::PhaseStart { name: "Submission" });
        let has_templates = entries
            .iter()
            .filter_map(|e| e.templates.as_deref())
            .any(|t| self.accepts_templates(t));
        let template_refs = if has_templates {
            let spec = TemplateSpec::PerEntry(entries.iter().map(|e| e.templates.clone()).collect());
            TemplateResolver::new(self.api).resolve(&names, &spec, Some(&batch_name))?
        } else {
            vec![Vec::new(); entries.len()]
        };

        let defaults = merge_settings(self.model, overrides);
        let mut request = BatchSubmission::default();
        for (entry, refs) in entries.iter().zip(&template_refs) {
            let mut settings = defaults.clone();
            settings.insert("sequence".into(), Value::String(entry.sequence.clone()));
            self.model.apply_templates(&mut settings, refs);
            request.push(entry.name.clone(), settings);
        }
        Submitter::new(self.api).submit_batch(&batch_name, self.model.job_type(), request)?;
        self.reporter.report(Progress::PhaseFinish);

        let mut submission = Submission {
            name: batch_name,
            kind: SubmissionKind::Batch,
            output_folder: self.monitor_config.output_folder.clone(),
            report: None,
            results: None,
        };
        if wait {
            let report = self.monitor().watch_batch(&submission.name)?;
            if report.is_complete() {
                submission.results =
                    aggregate(&submission.output_folder, &self.model.results_spec())?;
            }
            submission.report = Some(report);
        }
        Ok(submission)
    }

    fn monitor(&self) -> Monitor<'_> {
        Monitor::new(
            self.api,
            &self.monitor_config,
            self.reporter,
            self.cancel.clone(),
        )
    }

    fn accepts_templates(&self, templates: &str) -> bool {
        if templates.trim().is_empty() {
            return false;
        }
        if !self.model.supports_templates() {
            warn!(
                "Model {} does not take template files, ignoring: {}",
                self.model.job_type(),
                templates
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::fake::{FakeApi, job, zip_bytes};
    use crate::core::models::{AlphaFold, Boltz};
    use crate::engine::config::MonitorConfigBuilder;
    use crate::engine::error::EngineError;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn config(output: &Path) -> MonitorConfig {
        MonitorConfigBuilder::new()
            .interval(Duration::from_millis(1))
            .max_ticks(10)
            .output_folder(output.to_path_buf())
            .build()
            .unwrap()
    }

    #[test]
    fn duplicate_entries_abort_before_any_remote_call() {
        let dir = tempdir().unwrap();
        let api = FakeApi::new();
        let reporter = ProgressReporter::new();
        let entries: Vec<Entry> = ["a", "b", "a", "c", "c"]
            .into_iter()
            .map(|n| Entry::new(n, "MKV"))
            .collect();
        let err = Predictor::new(&api, &Boltz, &reporter, config(dir.path()))
            .batch(Some("b1"), &entries, None, false)
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateNames { names } if names == ["a", "c"]));
        assert_eq!(api.submission_calls(), 0);
        assert!(api.job_queries.borrow().is_empty());
    }

    #[test]
    fn batch_settings_merge_defaults_overrides_and_sequence() {
        let dir = tempdir().unwrap();
        let api = FakeApi::new();
        let reporter = ProgressReporter::new();
        let overrides: Settings = json!({"numSamples": 1}).as_object().cloned().unwrap();
        let entries = vec![Entry::new("x", "AAA"), Entry::new("y", "CCC")];

        let submission = Predictor::new(&api, &Boltz, &reporter, config(dir.path()))
            .batch(Some("b1"), &entries, Some(&overrides), false)
            .unwrap();

        assert_eq!(submission.kind, SubmissionKind::Batch);
        assert!(submission.notice().contains("tmr monitor b1"));
        let sent = &api.submitted_batches.borrow()[0];
        assert_eq!(sent.batch_name, "b1");
        assert_eq!(sent.job_type, "boltz");
        assert_eq!(sent.job_names, vec!["x", "y"]);
        assert_eq!(sent.settings[0]["sequence"], json!("AAA"));
        assert_eq!(sent.settings[1]["sequence"], json!("CCC"));
        assert_eq!(sent.settings[0]["numSamples"], json!(1));
        assert_eq!(sent.settings[0]["version"], json!("2.1.1"));
    }

    #[test]
    fn shared_template_is_uploaded_once_for_the_whole_batch() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("t.cif");
        fs::write(&template, "data_t\nloop_\n").unwrap();
        let template = template.to_string_lossy().into_owned();

        let api = FakeApi::new();
        let reporter = ProgressReporter::new();
        let entries = vec![
            Entry::new("x", "AAA").with_templates(template.clone()),
            Entry::new("y", "CCC").with_templates(template),
            Entry::new("z", "GGG"),
        ];
        Predictor::new(&api, &AlphaFold, &reporter, config(dir.path()))
            .batch(Some("b1"), &entries, None, false)
            .unwrap();

        assert_eq!(api.uploads.borrow().len(), 1);
        let sent = &api.submitted_batches.borrow()[0];
        assert_eq!(sent.settings[0]["templateFiles"], json!(["b1/t.cif"]));
        assert_eq!(sent.settings[0]["pdb100Templates"], json!(false));
        assert_eq!(sent.settings[1]["templateFiles"], json!(["b1/t.cif"]));
        assert!(sent.settings[2].get("templateFiles").is_none());
        assert_eq!(sent.settings[2]["pdb100Templates"], json!(true));
    }

    #[test]
    fn waiting_batch_is_monitored_downloaded_and_aggregated() {
        let dir = tempdir().unwrap();
        let metrics = "Rank,Pdb Path\n2,r2.pdb\n1,r1.pdb\n";
        let api = FakeApi::new()
            .with_batch_frames(vec![
                vec![job("x", "Running"), job("y", "Queued")],
                vec![job("x", "Complete"), job("y", "Complete")],
            ])
            .with_archive("x", zip_bytes(&[("metrics.csv", metrics)]))
            .with_archive("y", zip_bytes(&[("metrics.csv", metrics)]));
        let reporter = ProgressReporter::new();
        let entries = vec![Entry::new("x", "AAA"), Entry::new("y", "CCC")];

        let submission = Predictor::new(&api, &AlphaFold, &reporter, config(dir.path()))
            .batch(Some("b1"), &entries, None, true)
            .unwrap();

        assert!(submission.is_finished());
        assert!(submission.notice().starts_with("Job completed"));
        let results = submission.results.unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results.column("name").unwrap(), vec!["x", "x", "y", "y"]);
        assert_eq!(results.column("Rank").unwrap(), vec!["1", "2", "1", "2"]);
        assert!(dir.path().join("results.csv").is_file());
    }

    #[test]
    fn single_run_generates_a_name_and_attaches_root_templates() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("solo.cif");
        fs::write(&template, "data_solo\n").unwrap();

        let api = FakeApi::new();
        let reporter = ProgressReporter::new();
        let submission = Predictor::new(&api, &AlphaFold, &reporter, config(dir.path()))
            .run(None, "MKV", Some(&template.to_string_lossy()), None, false)
            .unwrap();

        assert_eq!(submission.name.len(), 6);
        assert_eq!(submission.kind, SubmissionKind::Job);
        assert!(submission.report.is_none());
        let sent = &api.submitted_jobs.borrow()[0];
        assert_eq!(sent.job_name, submission.name);
        assert_eq!(sent.settings["templateFiles"], json!(["solo.cif"]));
        assert_eq!(api.uploads.borrow()[0].folder, None);
    }

    #[test]
    fn templates_are_ignored_for_models_without_support() {
        let dir = tempdir().unwrap();
        let api = FakeApi::new();
        let reporter = ProgressReporter::new();
        Predictor::new(&api, &crate::core::models::IntFold, &reporter, config(dir.path()))
            .run(Some("j1"), "MKV", Some("/no/such.cif"), None, false)
            .unwrap();
        assert!(api.uploads.borrow().is_empty());
        assert_eq!(api.submitted_jobs.borrow().len(), 1);
    }

    #[test]
    fn waiting_single_run_follows_the_job() {
        let dir = tempdir().unwrap();
        let api = FakeApi::new()
            .with_job_frames(vec![vec![job("j1", "Running")], vec![job("j1", "Complete")]])
            .with_archive("j1", zip_bytes(&[("metrics.csv", "Rank\n1\n")]));
        let reporter = ProgressReporter::new();
        let submission = Predictor::new(&api, &AlphaFold, &reporter, config(dir.path()))
            .run(Some("j1"), "MKV", None, None, true)
            .unwrap();
        assert!(submission.is_finished());
        assert!(dir.path().join("j1/metrics.csv").is_file());
    }
}
