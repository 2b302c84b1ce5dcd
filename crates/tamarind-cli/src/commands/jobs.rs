use super::with_client;
use crate::cli::JobsArgs;
use crate::config::AppConfig;
use crate::error::Result;
use serde_json::Value;
use tamarind::core::api::JobRecord;
use tamarind::engine::selection::JobFilter;
use tamarind::workflows::manage::JobManager;

pub async fn run(args: JobsArgs, config: &AppConfig) -> Result<()> {
    let filter = JobFilter {
        job_name: args.name,
        organization: args.organization,
        expand_batch: args.expand,
        job_type: args.job_type,
    };
    let jobs = with_client(config, move |api, _cancel| Ok(JobManager::new(api).list_jobs(&filter)?))
        .await?;

    if jobs.is_empty() {
        println!("No jobs found.");
    } else {
        print!("{}", format_jobs(&jobs));
    }
    Ok(())
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One aligned line per job: name, model, status, batch and creation time.
fn format_jobs(jobs: &[JobRecord]) -> String {
    let width = jobs
        .iter()
        .map(|j| j.name.len())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{:<width$}  {:<10}  {:<9}  {:<10}  {}\n",
        "NAME", "MODEL", "STATUS", "BATCH", "CREATED"
    );
    for job in jobs {
        let model = if job.is_batch() {
            format!("{}*", job.model())
        } else {
            job.model().to_string()
        };
        out.push_str(&format!(
            "{:<width$}  {:<10}  {:<9}  {:<10}  {}\n",
            job.name,
            model,
            job.status.as_str(),
            job.batch.as_deref().unwrap_or("-"),
            text(&job.created)
        ));
    }
    out
}
