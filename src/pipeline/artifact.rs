use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::DatasetRecord;
use crate::error::{EtlError, Result};

/// Serialize records to `path` as NDJSON, one record per line. The file is
/// written to a temporary sibling and renamed into place, so a failed run
/// never leaves a truncated artifact behind.
pub fn write_records(path: &Path, records: &[DatasetRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    if let Err(e) = write_lines(&tmp, records) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path)?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn write_lines(path: &Path, records: &[DatasetRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        let line = serde_json::to_string(record)?;
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Parse an artifact back into records. Blank lines are skipped; any other
/// deviation from the line schema is an error.
pub fn read_records(path: &Path) -> Result<Vec<DatasetRecord>> {
    if !path.is_file() {
        return Err(EtlError::SourceNotFound(path.display().to_string()));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MISSING_SECTION;
    use crate::domain::SoapNote;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn record(id: &str) -> DatasetRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), json!("primock57"));
        metadata.insert("turns".to_string(), json!(12));
        DatasetRecord {
            id: id.to_string(),
            transcript: "DOCTOR: hello\nPATIENT: hi".to_string(),
            note: SoapNote {
                subjective: "sore throat".to_string(),
                objective: MISSING_SECTION.to_string(),
                assessment: "pharyngitis".to_string(),
                plan: "fluids\nreview in a week".to_string(),
            },
            metadata,
        }
    }

    #[test]
    fn records_round_trip_including_sentinels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("soap_dataset.ndjson");
        let records = vec![record("one"), record("two")];

        write_records(&path, &records).unwrap();
        let reread = read_records(&path).unwrap();

        assert_eq!(reread, records);
        assert_eq!(reread[0].note.objective, MISSING_SECTION);
    }

    #[test]
    fn serialized_lines_are_self_describing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("soap_dataset.ndjson");
        write_records(&path, &[record("one")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
        assert_eq!(value["id"], "one");
        assert_eq!(value["objective"], MISSING_SECTION);
        assert_eq!(value["metadata"]["source"], "primock57");
    }

    #[test]
    fn writing_leaves_no_temporary_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.ndjson");
        write_records(&path, &[record("one")]).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["out.ndjson"]);
    }

    #[test]
    fn writing_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("out.ndjson");
        write_records(&path, &[record("one")]).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn reading_a_missing_artifact_is_source_not_found() {
        let dir = tempdir().unwrap();
        let err = read_records(&dir.path().join("nope.ndjson")).unwrap_err();
        assert!(matches!(err, EtlError::SourceNotFound(_)));
    }

    #[test]
    fn blank_lines_are_skipped_on_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.ndjson");
        write_records(&path, &[record("one")]).unwrap();
        let mut raw = fs::read_to_string(&path).unwrap();
        raw.push_str("\n\n");
        fs::write(&path, raw).unwrap();

        assert_eq!(read_records(&path).unwrap().len(), 1);
    }
}
