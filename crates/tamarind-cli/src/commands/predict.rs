use super::with_client;
use crate::cli::PredictArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::input::read_entries;
use crate::utils::progress::CliProgressHandler;
use tamarind::engine::progress::ProgressReporter;
use tamarind::engine::submit::parse_settings;
use tamarind::workflows::manage::JobManager;
use tamarind::workflows::predict::Predictor;
use tracing::info;

pub async fn run(args: PredictArgs, config: &AppConfig) -> Result<()> {
    info!("Reading entries from {:?}", &args.input);
    let entries = read_entries(&args.input)?;
    let overrides = args.setting.as_deref().map(parse_settings).transpose()?;
    let monitor_config = config.monitor_config(&args.poll, args.output.as_deref(), false)?;
    let model = args.model.spec();
    let batch_name = args.name;
    let wait = !args.nowait;

    println!(
        "Submitting {} sequence(s) to {}...",
        entries.len(),
        model.job_type()
    );

    let submission = with_client(config, move |api, cancel| {
        if let Some(name) = &batch_name {
            if JobManager::new(api).job_exists(name)? {
                return Err(CliError::Argument(format!(
                    "Batch {} already exists, please choose another name",
                    name
                )));
            }
        }

        let progress_handler = CliProgressHandler::new();
        let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
        let submission = Predictor::new(api, model, &reporter, monitor_config)
            .with_cancel(cancel)
            .batch(batch_name.as_deref(), &entries, overrides.as_ref(), wait)?;
        Ok(submission)
    })
    .await?;

    if let Some(results) = &submission.results {
        println!(
            "Merged {} result row(s) into {}",
            results.len(),
            submission
                .output_folder
                .join(tamarind::engine::aggregate::RESULTS_FILE)
                .display()
        );
    }
    println!("{}", submission.notice());
    Ok(())
}
