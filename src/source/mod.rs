use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::constants::{DOCTOR_SUFFIX, NOTES_DIR, PATIENT_SUFFIX, TRANSCRIPTS_DIR};
use crate::domain::{RawCase, Speaker, Turn};
use crate::error::{EtlError, Result};

pub mod textgrid;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern must compile"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

/// Strip XML-ish markup tags and collapse runs of whitespace.
pub fn clean_utterance(raw: &str) -> String {
    let untagged = TAG_RE.replace_all(raw, "");
    WS_RE.replace_all(&untagged, " ").trim().to_string()
}

/// Reads the raw consultation corpus: paired doctor/patient TextGrid
/// transcripts under `transcripts/` and clinician note JSON under `notes/`.
/// Read-only; re-reading yields the same case sequence.
pub struct CaseLoader {
    root: PathBuf,
}

impl CaseLoader {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Case ids present in the corpus, in ascending order.
    pub fn case_ids(&self) -> Result<Vec<String>> {
        let transcripts_dir = self.root.join(TRANSCRIPTS_DIR);
        if !transcripts_dir.is_dir() {
            return Err(EtlError::SourceNotFound(
                transcripts_dir.display().to_string(),
            ));
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&transcripts_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(id) = name.strip_suffix(DOCTOR_SUFFIX) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        debug!("Discovered {} cases under {}", ids.len(), self.root.display());
        Ok(ids)
    }

    /// Lazily load every case in id order. Discovery errors surface up front;
    /// per-case errors surface as the sequence is consumed.
    pub fn cases(&self) -> Result<impl Iterator<Item = Result<RawCase>> + '_> {
        let ids = self.case_ids()?;
        Ok(ids.into_iter().map(move |id| self.load_case(&id)))
    }

    /// Assemble one case from its three source files.
    pub fn load_case(&self, id: &str) -> Result<RawCase> {
        let transcripts_dir = self.root.join(TRANSCRIPTS_DIR);
        let doctor_path = transcripts_dir.join(format!("{}{}", id, DOCTOR_SUFFIX));
        let patient_path = transcripts_dir.join(format!("{}{}", id, PATIENT_SUFFIX));
        let note_path = self.root.join(NOTES_DIR).join(format!("{}.json", id));

        if !patient_path.is_file() {
            return Err(malformed(id, "missing patient transcript"));
        }
        if !note_path.is_file() {
            return Err(malformed(id, "missing clinician note"));
        }

        let mut turns = read_turns(&doctor_path, Speaker::Doctor)?;
        turns.extend(read_turns(&patient_path, Speaker::Patient)?);
        // Stable sort: the doctor's turn leads when both speak at once.
        turns.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));

        if turns.is_empty() {
            return Err(malformed(id, "no utterances in either transcript"));
        }

        let (note_text, presenting_complaint) = read_note(&note_path, id)?;

        Ok(RawCase {
            id: id.to_string(),
            turns,
            note_text,
            presenting_complaint,
        })
    }
}

fn malformed(id: &str, reason: &str) -> EtlError {
    EtlError::MalformedSource {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn read_turns(path: &Path, speaker: Speaker) -> Result<Vec<Turn>> {
    let content = fs::read_to_string(path)?;
    let intervals = textgrid::parse_speaker_tier(&content);
    if intervals.is_empty() {
        warn!("No Speaker intervals found in {}", path.display());
    }

    Ok(intervals
        .into_iter()
        .filter_map(|interval| {
            let text = clean_utterance(&interval.text);
            if text.is_empty() {
                None
            } else {
                Some(Turn {
                    speaker,
                    start: interval.xmin,
                    text,
                })
            }
        })
        .collect())
}

fn read_note(path: &Path, id: &str) -> Result<(String, Option<String>)> {
    let raw = fs::read_to_string(path)?;
    let mut value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| malformed(id, &format!("note file is not valid JSON: {}", e)))?;

    // Some note files are double-encoded: the document is a JSON string that
    // itself contains the JSON object.
    if let serde_json::Value::String(inner) = &value {
        value = serde_json::from_str(inner)
            .map_err(|e| malformed(id, &format!("note file is double-encoded but inner JSON is invalid: {}", e)))?;
    }

    let note_text = value
        .get("note")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| malformed(id, "note field missing"))?
        .to_string();

    let presenting_complaint = value
        .get("presenting_complaint")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Ok((note_text, presenting_complaint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_grid(dir: &Path, name: &str, utterances: &[(f64, &str)]) {
        let mut body = String::from(
            "File type = \"ooTextFile\"\nObject class = \"TextGrid\"\n\nitem []:\n    item [1]:\n        class = \"IntervalTier\"\n        name = \"Speaker\"\n        xmin = 0\n        xmax = 100\n",
        );
        for (i, (xmin, text)) in utterances.iter().enumerate() {
            body.push_str(&format!(
                "        intervals [{}]:\n            xmin = {}\n            xmax = {}\n            text = \"{}\"\n",
                i + 1,
                xmin,
                xmin + 1.0,
                text
            ));
        }
        fs::write(dir.join(name), body).unwrap();
    }

    fn seed_case(root: &Path, id: &str, note_json: &str) {
        let transcripts = root.join(TRANSCRIPTS_DIR);
        let notes = root.join(NOTES_DIR);
        fs::create_dir_all(&transcripts).unwrap();
        fs::create_dir_all(&notes).unwrap();
        write_grid(
            &transcripts,
            &format!("{}{}", id, DOCTOR_SUFFIX),
            &[(0.0, "what brings you in"), (4.0, "any fevers")],
        );
        write_grid(
            &transcripts,
            &format!("{}{}", id, PATIENT_SUFFIX),
            &[(2.0, "my throat hurts"), (5.5, "no fevers")],
        );
        fs::write(notes.join(format!("{}.json", id)), note_json).unwrap();
    }

    #[test]
    fn clean_utterance_strips_tags_and_collapses_whitespace() {
        assert_eq!(
            clean_utterance("  so <cough>  it hurts\twhen   I swallow "),
            "so it hurts when I swallow"
        );
    }

    #[test]
    fn loads_a_case_with_interleaved_turns() {
        let dir = tempdir().unwrap();
        seed_case(dir.path(), "day1_consultation01", r#"{"note": "S: sore throat"}"#);

        let loader = CaseLoader::new(dir.path());
        let case = loader.load_case("day1_consultation01").unwrap();
        assert_eq!(
            case.transcript_text(),
            "DOCTOR: what brings you in\nPATIENT: my throat hurts\nDOCTOR: any fevers\nPATIENT: no fevers"
        );
        assert_eq!(case.note_text, "S: sore throat");
        assert!(case.presenting_complaint.is_none());
    }

    #[test]
    fn double_encoded_notes_are_unwrapped() {
        let dir = tempdir().unwrap();
        let inner = r#"{"note": "Plan: rest", "presenting_complaint": "headache"}"#;
        let doubled = serde_json::to_string(inner).unwrap();
        seed_case(dir.path(), "day1_consultation02", &doubled);

        let loader = CaseLoader::new(dir.path());
        let case = loader.load_case("day1_consultation02").unwrap();
        assert_eq!(case.note_text, "Plan: rest");
        assert_eq!(case.presenting_complaint.as_deref(), Some("headache"));
    }

    #[test]
    fn missing_root_is_source_not_found() {
        let loader = CaseLoader::new("definitely/not/here");
        assert!(matches!(
            loader.case_ids().unwrap_err(),
            EtlError::SourceNotFound(_)
        ));
    }

    #[test]
    fn missing_note_is_malformed_source_naming_the_case() {
        let dir = tempdir().unwrap();
        seed_case(dir.path(), "day2_consultation01", r#"{"note": "S: ok"}"#);
        fs::remove_file(
            dir.path()
                .join(NOTES_DIR)
                .join("day2_consultation01.json"),
        )
        .unwrap();

        let loader = CaseLoader::new(dir.path());
        match loader.load_case("day2_consultation01").unwrap_err() {
            EtlError::MalformedSource { id, .. } => assert_eq!(id, "day2_consultation01"),
            other => panic!("expected MalformedSource, got {:?}", other),
        }
    }

    #[test]
    fn note_without_note_field_is_malformed() {
        let dir = tempdir().unwrap();
        seed_case(dir.path(), "day2_consultation02", r#"{"summary": "nope"}"#);

        let loader = CaseLoader::new(dir.path());
        assert!(matches!(
            loader.load_case("day2_consultation02").unwrap_err(),
            EtlError::MalformedSource { .. }
        ));
    }

    #[test]
    fn case_ids_are_sorted_and_restartable() {
        let dir = tempdir().unwrap();
        seed_case(dir.path(), "day2_consultation01", r#"{"note": "S: b"}"#);
        seed_case(dir.path(), "day1_consultation01", r#"{"note": "S: a"}"#);

        let loader = CaseLoader::new(dir.path());
        let first = loader.case_ids().unwrap();
        let second = loader.case_ids().unwrap();
        assert_eq!(first, vec!["day1_consultation01", "day2_consultation01"]);
        assert_eq!(first, second);
    }
}
