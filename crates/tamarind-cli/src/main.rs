mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.global.verbose, cli.global.quiet, cli.global.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("tmr v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Parsed command: {:?}", &cli.command);

    let app_config = config::build_config(&cli.global)?;

    let command_result = match cli.command {
        Commands::Predict(args) => {
            info!("Dispatching to 'predict' command.");
            commands::predict::run(args, &app_config).await
        }
        Commands::Monitor(args) => {
            info!("Dispatching to 'monitor' command.");
            commands::monitor::run(args, &app_config).await
        }
        Commands::Download(args) => {
            info!("Dispatching to 'download' command.");
            commands::download::run(args, &app_config).await
        }
        Commands::Delete(args) => {
            info!("Dispatching to 'delete' command.");
            commands::delete::run(args, &app_config).await
        }
        Commands::Jobs(args) => {
            info!("Dispatching to 'jobs' command.");
            commands::jobs::run(args, &app_config).await
        }
        Commands::Files(args) => {
            info!("Dispatching to 'files' command.");
            commands::files::run(args, &app_config).await
        }
        Commands::Aggregate(args) => {
            info!("Dispatching to 'aggregate' command.");
            commands::aggregate::run(args).await
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
