use std::fs::File;
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipResult;

/// Extracts every entry of the zip archive at `archive_path` into `dest_dir`.
///
/// Entry names that would escape `dest_dir` are rejected by the zip reader.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> ZipResult<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;
    archive.extract(dest_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::fake::zip_bytes;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extracts_nested_entries() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("result.zip");
        fs::write(
            &archive,
            zip_bytes(&[("metrics.csv", "Rank\n1\n"), ("models/rank_1.pdb", "ATOM\n")]),
        )
        .unwrap();

        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        extract_zip(&archive, &out).unwrap();

        assert_eq!(fs::read_to_string(out.join("metrics.csv")).unwrap(), "Rank\n1\n");
        assert!(out.join("models/rank_1.pdb").is_file());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("result.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();
        assert!(extract_zip(&archive, dir.path()).is_err());
    }
}
