use crate::error::{CliError, Result};
use std::path::Path;
use tamarind::workflows::predict::Entry;
use tracing::{debug, warn};

const NAME_COLUMN: &str = "name";
const SEQUENCE_COLUMN: &str = "sequence";
const TEMPLATE_COLUMN: &str = "template";

/// Reads prediction entries from a CSV file with `name` and `sequence` columns and an
/// optional `template` column of `;`-separated `.cif` paths.
pub fn read_entries(path: &Path) -> Result<Vec<Entry>> {
    let parse_error = |source: anyhow::Error| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| parse_error(e.into()))?;
    let headers = reader.headers().map_err(|e| parse_error(e.into()))?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let name_idx = column(NAME_COLUMN)
        .ok_or_else(|| parse_error(anyhow::anyhow!("missing column '{}'", NAME_COLUMN)))?;
    let sequence_idx = column(SEQUENCE_COLUMN)
        .ok_or_else(|| parse_error(anyhow::anyhow!("missing column '{}'", SEQUENCE_COLUMN)))?;
    let template_idx = column(TEMPLATE_COLUMN);

    let mut entries = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| parse_error(e.into()))?;
        let name = record.get(name_idx).unwrap_or_default();
        let sequence = record.get(sequence_idx).unwrap_or_default();
        if name.is_empty() || sequence.is_empty() {
            warn!("Skipping row {} of {}: empty name or sequence", row + 1, path.display());
            continue;
        }
        let mut entry = Entry::new(name, sequence);
        if let Some(templates) = template_idx
            .and_then(|i| record.get(i))
            .filter(|t| !t.is_empty())
        {
            entry = entry.with_templates(templates);
        }
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(parse_error(anyhow::anyhow!("no entries found")));
    }
    debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_input(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_entries_with_optional_templates() {
        let (_dir, path) = write_input(
            "name,sequence,template\nseq1,MKTAYIAK,\nseq2, GSHMLE ,a.cif; b.cif\n",
        );
        let entries = read_entries(&path).unwrap();
        assert_eq!(
            entries,
            vec![
                Entry::new("seq1", "MKTAYIAK"),
                Entry::new("seq2", "GSHMLE").with_templates("a.cif; b.cif"),
            ]
        );
    }

    #[test]
    fn template_column_is_optional() {
        let (_dir, path) = write_input("sequence,name\nAAAA,x\n");
        let entries = read_entries(&path).unwrap();
        assert_eq!(entries, vec![Entry::new("x", "AAAA")]);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let (_dir, path) = write_input("id,sequence\nx,AAAA\n");
        let err = read_entries(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn blank_rows_are_skipped_but_an_empty_file_is_fatal() {
        let (_dir, path) = write_input("name,sequence\n,AAAA\ny,CCCC\n");
        assert_eq!(read_entries(&path).unwrap(), vec![Entry::new("y", "CCCC")]);

        let (_dir, path) = write_input("name,sequence\n");
        assert!(read_entries(&path).is_err());
    }
}
