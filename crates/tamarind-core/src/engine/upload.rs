use super::error::Result;
use crate::core::api::{FileQuery, TamarindApi};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Local path → remote name (or `folder/name` inside a batch folder).
pub type UploadMap = BTreeMap<PathBuf, String>;

pub struct FileUploader<'a> {
    api: &'a dyn TamarindApi,
}

impl<'a> FileUploader<'a> {
    pub fn new(api: &'a dyn TamarindApi) -> Self {
        Self { api }
    }

    pub fn upload(&self, local_path: &Path, remote_name: &str, folder: Option<&str>) -> Result<()> {
        debug!(?local_path, remote_name, ?folder, "Uploading file");
        self.api.upload_file(local_path, remote_name, folder)?;
        Ok(())
    }

    /// Uploads every distinct path into the batch folder `folder`.
    ///
    /// With `empty_first` the remote folder is cleared beforehand (a failure to clear is only
    /// logged); otherwise the files already present count as taken names.
    pub fn upload_batch<I, P>(&self, folder: &str, paths: I, empty_first: bool) -> Result<UploadMap>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let taken = if empty_first {
            if let Err(e) = self.api.delete_folder(folder) {
                warn!("Could not empty remote folder '{}': {}", folder, e);
            }
            HashSet::new()
        } else {
            self.api
                .list_files(&FileQuery {
                    folder: Some(folder.to_string()),
                    include_folders: false,
                })?
                .into_iter()
                .collect()
        };
        let mapping = self.upload_unique(Some(folder), paths, taken)?;
        info!("Uploaded {} file(s) into '{}'", mapping.len(), folder);
        Ok(mapping)
    }

    /// Uploads every distinct path into the root folder.
    pub fn upload_root<I, P>(&self, paths: I) -> Result<UploadMap>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.upload_unique(None, paths, HashSet::new())
    }

    fn upload_unique<I, P>(
        &self,
        folder: Option<&str>,
        paths: I,
        mut taken: HashSet<String>,
    ) -> Result<UploadMap>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        // Sorted so that colliding base names get the same suffixes on every run.
        let unique: BTreeSet<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .filter(|p| !p.as_os_str().is_empty())
            .collect();

        let mut mapping = UploadMap::new();
        for path in unique {
            let (name, full_name) = unique_remote_name(&path, folder, &taken);
            self.upload(&path, &name, folder)?;
            taken.insert(full_name.clone());
            mapping.insert(path, full_name);
        }
        debug!("Upload mapping: {:?}", mapping);
        Ok(mapping)
    }
}

/// Picks `stem.ext`, then `stem2.ext`, `stem3.ext`, ... until the full remote name is free.
/// Returns the bare remote name and the name qualified by `folder`.
pub fn unique_remote_name(
    local_path: &Path,
    folder: Option<&str>,
    taken: &HashSet<String>,
) -> (String, String) {
    let stem = local_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = local_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let qualify = |name: &str| match folder {
        Some(folder) => format!("{}/{}", folder, name),
        None => name.to_string(),
    };

    let mut name = format!("{}{}", stem, ext);
    let mut full_name = qualify(&name);
    let mut i = 2;
    while taken.contains(&full_name) {
        name = format!("{}{}{}", stem, i, ext);
        full_name = qualify(&name);
        i += 1;
    }
    (name, full_name)
}
