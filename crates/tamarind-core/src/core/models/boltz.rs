use super::{ModelSpec, ResultsSpec, SortDirection, settings};
use crate::core::api::Settings;
use serde_json::json;

#[derive(Debug, Clone, Copy, Default)]
pub struct Boltz;

impl ModelSpec for Boltz {
    fn job_type(&self) -> &'static str {
        "boltz"
    }

    // Available versions: 2.1.1, 1.0.0, 0.4.0
    fn default_options(&self) -> Settings {
        settings(json!({
            "inputFormat": "sequence",
            "addLigands": false,
            "numSamples": 5,
            "numBatches": 1,
            "numRecycles": 3,
            "predictAffinity": false,
            "binderChain": "A",
            "stepScale": 1.638,
            "seed": 0,
            "bonds": "",
            "pocketRestraints": "",
            "outputType": "pdb",
            "version": "2.1.1",
            "templateFiles": [],
            "templateMapping": [],
        }))
    }

    fn results_spec(&self) -> ResultsSpec {
        ResultsSpec {
            metrics_file: "metrics.csv",
            sort_column: "iptm",
            direction: SortDirection::Descending,
            path_source_column: "pdb_filepath",
            path_column: "pdb_filepath",
            // The service currently doubles the prefix in pdb_filepath.
            path_fixups: &[("result_result_", "result_")],
        }
    }
}
