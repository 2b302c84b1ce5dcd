use super::with_client;
use crate::cli::DeleteArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use tamarind::engine::selection::JobFilter;
use tamarind::workflows::manage::JobManager;

pub async fn run(args: DeleteArgs, config: &AppConfig) -> Result<()> {
    match args.name {
        Some(name) => {
            let is_batch = with_client(config, move |api, _cancel| {
                let manager = JobManager::new(api);
                if manager.is_batch(&name)? {
                    manager.delete_batch(&name)?;
                    Ok(true)
                } else {
                    manager.delete_job(&name)?;
                    Ok(false)
                }
            })
            .await?;
            println!("{} deleted.", if is_batch { "Batch" } else { "Job" });
            Ok(())
        }
        None => {
            let filter = JobFilter {
                job_type: args.job_type,
                ..JobFilter::all()
            };
            let leftovers =
                with_client(config, move |api, _cancel| Ok(JobManager::new(api).delete_all_jobs(&filter)?))
                    .await?;
            if leftovers.is_empty() {
                println!("All jobs have been deleted.");
                Ok(())
            } else {
                let names: Vec<&str> = leftovers.iter().map(|j| j.name.as_str()).collect();
                Err(CliError::Other(anyhow::anyhow!(
                    "{} job(s) could not be deleted: {}",
                    names.len(),
                    names.join(", ")
                )))
            }
        }
    }
}
