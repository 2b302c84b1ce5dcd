use super::{ModelSpec, ResultsSpec, SortDirection, settings};
use crate::core::api::Settings;
use serde_json::json;

#[derive(Debug, Clone, Copy, Default)]
pub struct IntFold;

impl ModelSpec for IntFold {
    fn job_type(&self) -> &'static str {
        "intfold"
    }

    fn default_options(&self) -> Settings {
        settings(json!({
            "inputFormat": "sequence",
            "numSamples": 5,
            "numBatches": "1",
            "seed": 0,
            "numRecycles": 10,
            "outputType": "pdb",
        }))
    }

    fn results_spec(&self) -> ResultsSpec {
        ResultsSpec {
            metrics_file: "result.csv",
            sort_column: "ranking_score",
            direction: SortDirection::Descending,
            path_source_column: "filename",
            path_column: "Pdb Path",
            path_fixups: &[],
        }
    }
}
