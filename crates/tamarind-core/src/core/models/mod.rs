//! Per-model capabilities.
//!
//! Every prediction model served by Tamarind shares the same submission, monitoring and
//! download plumbing. What differs is captured by [`ModelSpec`]: the job type string, the
//! default options sent with each job, how template references are attached, and where the
//! ranked metrics of a finished job live.

mod alphafold;
mod boltz;
mod intfold;

pub use crate::core::io::table::SortDirection;
pub use alphafold::AlphaFold;
pub use boltz::Boltz;
pub use intfold::IntFold;

use crate::core::api::Settings;
use serde_json::json;

/// Where a model writes its per-job metrics and how to rank them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsSpec {
    /// Metrics file name inside each extracted job folder.
    pub metrics_file: &'static str,
    /// Column used to rank the rows of one job.
    pub sort_column: &'static str,
    pub direction: SortDirection,
    /// Column holding the structure path relative to the job folder.
    pub path_source_column: &'static str,
    /// Column that receives the path rewritten under the output folder.
    pub path_column: &'static str,
    /// Literal `(from, to)` substitutions applied to the rewritten path.
    pub path_fixups: &'static [(&'static str, &'static str)],
}

pub trait ModelSpec: Send + Sync {
    /// The `type` sent to the service.
    fn job_type(&self) -> &'static str;

    /// A fresh copy of the default options for one job.
    fn default_options(&self) -> Settings;

    fn results_spec(&self) -> ResultsSpec;

    fn supports_templates(&self) -> bool {
        false
    }

    /// Records uploaded template references in a job's settings.
    fn apply_templates(&self, settings: &mut Settings, templates: &[String]) {
        if !templates.is_empty() {
            settings.insert("templateFiles".into(), json!(templates));
        }
    }
}

pub const MODEL_NAMES: &[&str] = &["alphafold", "boltz", "intfold"];

/// Looks up a model by its job type.
pub fn lookup(name: &str) -> Option<&'static dyn ModelSpec> {
    match name {
        "alphafold" => Some(&AlphaFold),
        "boltz" => Some(&Boltz),
        "intfold" => Some(&IntFold),
        _ => None,
    }
}

fn settings(value: serde_json::Value) -> Settings {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Settings::new(),
    }
}
