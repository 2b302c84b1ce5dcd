use super::error::{EngineError, Result};
use crate::core::io::table::ResultTable;
use crate::core::models::ResultsSpec;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub const RESULTS_FILE: &str = "results.csv";

/// Column holding the job folder a row came from.
pub const NAME_COLUMN: &str = "name";

/// Merges the metrics file of every job folder under `output_folder` into
/// `output_folder/results.csv`.
///
/// Job folders are visited in name order. Returns `None` when the folder does not exist or
/// holds no metrics file.
pub fn aggregate(output_folder: &Path, spec: &ResultsSpec) -> Result<Option<ResultTable>> {
    if !output_folder.is_dir() {
        warn!(
            "Output folder {} does not exist, nothing to aggregate",
            output_folder.display()
        );
        return Ok(None);
    }

    let mut job_dirs: Vec<String> = Vec::new();
    for entry in fs::read_dir(output_folder)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            job_dirs.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    job_dirs.sort();

    let mut tables = Vec::new();
    for job in &job_dirs {
        let metrics = output_folder.join(job).join(spec.metrics_file);
        if !metrics.is_file() {
            debug!("No {} in {}", spec.metrics_file, job);
            continue;
        }
        let mut table = ResultTable::read_csv(&metrics).map_err(|source| EngineError::Table {
            path: metrics.clone(),
            source,
        })?;
        if !table.sort_numeric(spec.sort_column, spec.direction) {
            warn!("{} has no '{}' column", metrics.display(), spec.sort_column);
        }
        table.fill_column(NAME_COLUMN, job);

        let job_dir = output_folder.join(job);
        let rewritten = table.map_column(spec.path_source_column, spec.path_column, |cell| {
            let mut path = job_dir.join(cell).to_string_lossy().into_owned();
            for (from, to) in spec.path_fixups {
                path = path.replace(from, to);
            }
            path
        });
        if !rewritten {
            warn!(
                "{} has no '{}' column",
                metrics.display(),
                spec.path_source_column
            );
        }
        tables.push(table);
    }

    if tables.is_empty() {
        info!("No {} found under {}", spec.metrics_file, output_folder.display());
        return Ok(None);
    }

    let merged = ResultTable::concat(tables);
    let out = output_folder.join(RESULTS_FILE);
    merged.write_csv(&out).map_err(|source| EngineError::Table {
        path: out.clone(),
        source,
    })?;
    info!("Wrote {} row(s) to {}", merged.len(), out.display());
    Ok(Some(merged))
}
