use super::config::ConfigError;
use crate::core::api::ApiError;
use crate::core::io::format::StructureFormat;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to process table '{path}': {source}", path = .path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to unpack archive '{path}': {source}", path = .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("There are {} duplicate entries: {}", .names.len(), .names.join(", "))]
    DuplicateNames { names: Vec<String> },

    #[error("File {} not found!", .path.display())]
    TemplateMissing { path: PathBuf },

    #[error("File {} is not a .cif file (detected format: '{format}')", .path.display())]
    TemplateFormat {
        path: PathBuf,
        format: StructureFormat,
    },

    #[error("Exactly one entry is allowed without a batch name, got {count}")]
    BatchNameRequired { count: usize },

    #[error("Number of entries mismatches number of template specs: {entries} vs {templates}")]
    TemplateCountMismatch { entries: usize, templates: usize },

    #[error("Job {name} cannot be created! {body}")]
    Submission { name: String, body: String },

    #[error("Job {0} is stopped!")]
    JobStopped(String),

    #[error("Job {0} is missing!")]
    JobMissing(String),

    #[error("Job {0} is not found!")]
    JobNotFound(String),

    #[error("Settings must be a JSON object, got: {0}")]
    InvalidSettings(String),
}
