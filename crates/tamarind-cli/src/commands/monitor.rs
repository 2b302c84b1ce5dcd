use super::with_client;
use crate::cli::MonitorArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use tamarind::engine::monitor::{JobCriteria, Monitor, MonitorEnd, MonitorReport};
use tamarind::engine::progress::ProgressReporter;
use tamarind::workflows::manage::JobManager;
use tracing::info;

pub async fn run(args: MonitorArgs, config: &AppConfig) -> Result<()> {
    let monitor_config =
        config.monitor_config(&args.poll, args.output.as_deref(), args.skip_download)?;

    let report = with_client(config, move |api, cancel| {
        let progress_handler = CliProgressHandler::new();
        let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
        let monitor = Monitor::new(api, &monitor_config, &reporter, cancel);

        let report = match &args.name {
            Some(name) if JobManager::new(api).is_batch(name)? => {
                info!("Monitoring batch {}", name);
                monitor.watch_batch(name)?
            }
            Some(name) => {
                info!("Monitoring job {}", name);
                monitor.watch_job(name)?
            }
            None => monitor.watch_jobs(&criteria(&args))?,
        };
        Ok(report)
    })
    .await?;

    println!("{}", describe(&report));
    Ok(())
}

fn criteria(args: &MonitorArgs) -> JobCriteria {
    JobCriteria {
        job_type: args.job_type.clone(),
        job_names: args.jobs.clone().map(|names| names.into_iter().collect()),
        expand_batch: !args.no_expand,
    }
}

fn describe(report: &MonitorReport) -> String {
    let reason = match report.end {
        MonitorEnd::AllTerminal => "all jobs finished",
        MonitorEnd::Cancelled => "interrupted",
        MonitorEnd::TickLimit => "poll limit reached",
        MonitorEnd::TimeLimit => "time limit reached",
    };
    let downloaded = report
        .downloads
        .iter()
        .filter(|(_, outcome)| outcome.is_success())
        .count();
    format!(
        "Stopped after {} poll(s), {}: {}. {} result(s) downloaded.",
        report.ticks, reason, report, downloaded
    )
}
