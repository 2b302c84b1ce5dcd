use regex::Regex;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

static PDB_RECORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(HEADER|TITLE|KEYWDS|REMARK|MODEL|END) ").unwrap());
static CIF_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(loop_|data_|_atom)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    Gz,
    Pdb,
    Cif,
    Unknown,
}

impl StructureFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureFormat::Gz => "gz",
            StructureFormat::Pdb => "pdb",
            StructureFormat::Cif => "cif",
            StructureFormat::Unknown => "",
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a structure file by extension, falling back to sniffing its lines.
///
/// `.gz` is reported as-is without looking inside the file.
pub fn guess_format(path: &Path) -> io::Result<StructureFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => return Ok(StructureFormat::Gz),
        Some("pdb") | Some("pdb1") => return Ok(StructureFormat::Pdb),
        Some("cif") => return Ok(StructureFormat::Cif),
        _ => {}
    }
    let bytes = fs::read(path)?;
    Ok(sniff_format(&String::from_utf8_lossy(&bytes)))
}

/// Returns the format announced by the first line that looks like a PDB record
/// or an mmCIF token.
pub fn sniff_format(content: &str) -> StructureFormat {
    for line in content.lines() {
        if PDB_RECORD.is_match(line) {
            return StructureFormat::Pdb;
        }
        if CIF_TOKEN.is_match(line) {
            return StructureFormat::Cif;
        }
    }
    StructureFormat::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extension_decides_without_reading() {
        let dir = tempdir().unwrap();
        // None of these files exist; the extension alone must be enough.
        assert_eq!(
            guess_format(&dir.path().join("x.gz")).unwrap(),
            StructureFormat::Gz
        );
        assert_eq!(
            guess_format(&dir.path().join("x.pdb1")).unwrap(),
            StructureFormat::Pdb
        );
        assert_eq!(
            guess_format(&dir.path().join("x.cif")).unwrap(),
            StructureFormat::Cif
        );
    }

    #[test]
    fn gz_wins_regardless_of_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.cif.gz");
        fs::write(&path, "HEADER    PLANT PROTEIN\n").unwrap();
        assert_eq!(guess_format(&path).unwrap(), StructureFormat::Gz);
    }

    #[test]
    fn sniffs_mmcif_loop_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("template.txt");
        fs::write(&path, "# comment\nloop_\n_atom_site.group_PDB\n").unwrap();
        assert_eq!(guess_format(&path).unwrap(), StructureFormat::Cif);
    }

    #[test]
    fn sniffs_pdb_header_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1crn.ent");
        fs::write(&path, "HEADER    PLANT PROTEIN   30-APR-81   1CRN\nATOM      1  N\n").unwrap();
        assert_eq!(guess_format(&path).unwrap(), StructureFormat::Pdb);
    }

    #[test]
    fn unrecognized_content_is_unknown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes");
        fs::write(&path, "just some text\nHEADERLESS\n").unwrap();
        let format = guess_format(&path).unwrap();
        assert_eq!(format, StructureFormat::Unknown);
        assert_eq!(format.to_string(), "");
    }

    #[test]
    fn missing_file_without_known_extension_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(guess_format(&dir.path().join("absent.txt")).is_err());
    }
}
