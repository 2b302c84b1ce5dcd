use super::error::{EngineError, Result};
use super::upload::FileUploader;
use crate::core::api::TamarindApi;
use crate::core::io::format::{StructureFormat, guess_format};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";\s*").unwrap());

/// Template files requested for a list of entries.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSpec {
    /// One `;`-separated list used by every entry.
    Shared(String),
    /// One optional `;`-separated list per entry.
    PerEntry(Vec<Option<String>>),
}

/// Splits a `;`-separated template list into distinct, trimmed, non-empty paths.
pub fn split_template_list(spec: &str) -> BTreeSet<String> {
    SEPARATOR
        .split(spec)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct TemplateResolver<'a> {
    uploader: FileUploader<'a>,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(api: &'a dyn TamarindApi) -> Self {
        Self {
            uploader: FileUploader::new(api),
        }
    }

    /// Validates and uploads the templates of every entry and returns, per entry, the sorted
    /// remote references to put in its settings.
    ///
    /// Without `batch_name` only a single entry is accepted and files go to the root folder.
    /// Every file is checked before anything is uploaded.
    pub fn resolve(
        &self,
        entry_names: &[String],
        spec: &TemplateSpec,
        batch_name: Option<&str>,
    ) -> Result<Vec<Vec<String>>> {
        let n = entry_names.len();
        if batch_name.is_none() && n != 1 {
            return Err(EngineError::BatchNameRequired { count: n });
        }

        let per_entry: Vec<BTreeSet<String>> = match spec {
            TemplateSpec::Shared(s) => vec![split_template_list(s); n],
            TemplateSpec::PerEntry(specs) => {
                if specs.len() != n {
                    return Err(EngineError::TemplateCountMismatch {
                        entries: n,
                        templates: specs.len(),
                    });
                }
                specs
                    .iter()
                    .map(|s| s.as_deref().map(split_template_list).unwrap_or_default())
                    .collect()
            }
        };

        let unique: BTreeSet<&String> = per_entry.iter().flatten().collect();
        if unique.is_empty() {
            return Ok(vec![Vec::new(); n]);
        }
        for path in &unique {
            validate_template(Path::new(path.as_str()))?;
        }

        info!("Uploading {} distinct template file(s)", unique.len());
        let mapping = match batch_name {
            Some(batch) => self.uploader.upload_batch(batch, &unique, true)?,
            None => self.uploader.upload_root(&unique)?,
        };

        Ok(per_entry
            .iter()
            .map(|files| {
                let mut refs: Vec<String> = files
                    .iter()
                    .filter_map(|f| mapping.get(&PathBuf::from(f)).cloned())
                    .collect();
                refs.sort();
                refs
            })
            .collect())
    }
}

fn validate_template(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(EngineError::TemplateMissing {
            path: path.to_path_buf(),
        });
    }
    let format = guess_format(path)?;
    if format != StructureFormat::Cif {
        return Err(EngineError::TemplateFormat {
            path: path.to_path_buf(),
            format,
        });
    }
    Ok(())
}
