use super::with_client;
use crate::cli::DownloadArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use tamarind::engine::progress::ProgressReporter;
use tamarind::workflows::manage::JobManager;

pub async fn run(args: DownloadArgs, config: &AppConfig) -> Result<()> {
    let output = config.output_folder(args.output.as_deref());
    let name = args.name;

    let outcomes = with_client(config, move |api, _cancel| {
        let manager = JobManager::new(api);
        if manager.is_batch(&name)? {
            let progress_handler = CliProgressHandler::new();
            let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
            Ok(manager.download_batch(&name, &output, &reporter)?)
        } else {
            let outcome = manager.download(&name, &output)?;
            Ok(vec![(name, outcome)])
        }
    })
    .await?;

    let mut failed = 0;
    for (job, outcome) in &outcomes {
        if !outcome.is_success() {
            failed += 1;
        }
        println!("{}: {}", job, outcome);
    }
    if failed > 0 {
        println!("{} of {} download(s) failed.", failed, outcomes.len());
    }
    Ok(())
}
