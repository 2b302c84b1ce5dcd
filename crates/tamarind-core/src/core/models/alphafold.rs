use super::{ModelSpec, ResultsSpec, SortDirection, settings};
use crate::core::api::Settings;
use serde_json::json;

#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaFold;

impl ModelSpec for AlphaFold {
    fn job_type(&self) -> &'static str {
        "alphafold"
    }

    fn default_options(&self) -> Settings {
        settings(json!({
            "numModels": "5",
            "msaMode": "mmseqs2_uniref_env",
            "numRecycles": "3",
            "numRelax": false,
            "pairMode": "unpaired_paired",
            "pdb100Templates": true,
            "randomSeed": 0,
            "maxMsa": "508:2048",
            "ipsaeScoring": false,
        }))
    }

    fn results_spec(&self) -> ResultsSpec {
        ResultsSpec {
            metrics_file: "metrics.csv",
            sort_column: "Rank",
            direction: SortDirection::Ascending,
            path_source_column: "Pdb Path",
            path_column: "Pdb Path",
            path_fixups: &[],
        }
    }

    fn supports_templates(&self) -> bool {
        true
    }

    /// Custom templates replace the PDB100 template search.
    fn apply_templates(&self, settings: &mut Settings, templates: &[String]) {
        if templates.is_empty() {
            return;
        }
        settings.insert("templateFiles".into(), json!(templates));
        settings.insert("pdb100Templates".into(), json!(false));
    }
}
