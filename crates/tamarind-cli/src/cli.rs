use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tamarind::core::models::{self, ModelSpec};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Yingyao Zhou",
    version,
    about = "tmr - submit, monitor and collect Tamarind.bio structure prediction jobs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a TOML configuration file (defaults to the per-user config file, if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Tamarind API key, overriding TAMARIND_API_KEY and the config file
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Base URL of the Tamarind API
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit the sequences of a CSV file as one batch and, by default, wait for the results.
    Predict(PredictArgs),
    /// Follow a job or a batch until it finishes, downloading results as jobs complete.
    Monitor(MonitorArgs),
    /// Download the results of a job or of every job in a batch.
    Download(DownloadArgs),
    /// Delete a job or a batch (with its uploaded files), or every job.
    Delete(DeleteArgs),
    /// List jobs.
    Jobs(JobsArgs),
    /// List or delete uploaded files.
    Files(FilesArgs),
    /// Merge the per-job metrics of a results folder into results.csv.
    Aggregate(AggregateArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelName {
    Alphafold,
    Boltz,
    Intfold,
}

impl ModelName {
    pub fn spec(self) -> &'static dyn ModelSpec {
        match self {
            ModelName::Alphafold => &models::AlphaFold,
            ModelName::Boltz => &models::Boltz,
            ModelName::Intfold => &models::IntFold,
        }
    }
}

/// Options shared by the commands that poll job status.
#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
    /// Seconds between two status checks
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Give up after this many status checks
    #[arg(long, value_name = "INT")]
    pub max_polls: Option<u64>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments for the `predict` subcommand.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Model to run.
    #[arg(value_enum)]
    pub model: ModelName,

    /// Input CSV file with columns "name" and "sequence", and optionally "template"
    /// (";"-separated .cif files).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Batch name, must not exist yet. A random name is generated if omitted.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Folder to store results.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Extra model options as a JSON object, overriding the model defaults.
    #[arg(long, value_name = "JSON")]
    pub setting: Option<String>,

    /// Exit right after submission without monitoring; download results later with
    /// `tmr download`.
    #[arg(short = 'W', long)]
    pub nowait: bool,

    #[command(flatten)]
    pub poll: PollArgs,
}

/// Arguments for the `monitor` subcommand.
#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Job or batch name. Omit it to follow every job selected by --type/--jobs.
    #[arg(value_name = "NAME", required_unless_present_any = ["job_type", "jobs"])]
    pub name: Option<String>,

    /// Follow only jobs of this model.
    #[arg(long = "type", value_name = "MODEL")]
    pub job_type: Option<String>,

    /// Follow only these jobs (comma-separated).
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub jobs: Option<Vec<String>>,

    /// Follow batch entries instead of the jobs inside them.
    #[arg(long)]
    pub no_expand: bool,

    /// Folder to store results.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Only wait; do not download results.
    #[arg(long)]
    pub skip_download: bool,

    #[command(flatten)]
    pub poll: PollArgs,
}

/// Arguments for the `download` subcommand.
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Job or batch name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Folder to store results. A batch is stored under <OUTPUT>/<NAME>.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `delete` subcommand.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Job or batch name.
    #[arg(value_name = "NAME", required_unless_present = "all", conflicts_with = "all")]
    pub name: Option<String>,

    /// Delete every job and batch.
    #[arg(long)]
    pub all: bool,

    /// With --all, delete only jobs of this model.
    #[arg(long = "type", value_name = "MODEL", requires = "all")]
    pub job_type: Option<String>,
}

/// Arguments for the `jobs` subcommand.
#[derive(Args, Debug)]
pub struct JobsArgs {
    /// Show only this job.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Include jobs of the whole organization.
    #[arg(long)]
    pub organization: bool,

    /// List the jobs inside batches instead of the batch entries.
    #[arg(long)]
    pub expand: bool,

    /// Show only jobs of this model.
    #[arg(long = "type", value_name = "MODEL")]
    pub job_type: Option<String>,
}

/// Arguments for the `files` subcommand.
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Only files inside this folder.
    #[arg(long, value_name = "FOLDER", conflicts_with = "all")]
    pub folder: Option<String>,

    /// Include folders in the listing.
    #[arg(long)]
    pub all: bool,

    /// Delete the listed files instead of printing them (the whole folder with --folder).
    #[arg(long)]
    pub delete: bool,
}

/// Arguments for the `aggregate` subcommand.
#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Model that produced the results.
    #[arg(value_enum)]
    pub model: ModelName,

    /// Results folder holding one sub-folder per job.
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_parses_model_and_flags() {
        let cli = Cli::parse_from([
            "tmr", "-vv", "predict", "boltz", "in.csv", "-n", "b1", "-W", "--setting",
            r#"{"numSamples":1}"#,
        ]);
        assert_eq!(cli.global.verbose, 2);
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.model, ModelName::Boltz);
        assert_eq!(args.model.spec().job_type(), "boltz");
        assert_eq!(args.name.as_deref(), Some("b1"));
        assert!(args.nowait);
        assert!(args.setting.is_some());
    }

    #[test]
    fn monitor_accepts_criteria_without_a_name() {
        let cli = Cli::parse_from(["tmr", "monitor", "--type", "alphafold", "--jobs", "a,b"]);
        let Commands::Monitor(args) = cli.command else {
            panic!("expected monitor");
        };
        assert!(args.name.is_none());
        assert_eq!(args.jobs, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(Cli::try_parse_from(["tmr", "monitor"]).is_err());
    }

    #[test]
    fn delete_needs_a_name_or_all() {
        assert!(Cli::try_parse_from(["tmr", "delete"]).is_err());
        assert!(Cli::try_parse_from(["tmr", "delete", "x", "--all"]).is_err());
        assert!(Cli::try_parse_from(["tmr", "delete", "--all", "--type", "boltz"]).is_ok());
    }

    #[test]
    fn global_options_work_after_the_subcommand() {
        let cli = Cli::parse_from(["tmr", "jobs", "--api-key", "k", "-q"]);
        assert_eq!(cli.global.api_key.as_deref(), Some("k"));
        assert!(cli.global.quiet);
    }
}
