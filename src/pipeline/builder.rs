use std::collections::{BTreeMap, HashSet};

use serde_json::json;

use crate::domain::{DatasetRecord, RawCase, SoapNote};
use crate::error::{EtlError, Result};

/// Assembles one `DatasetRecord` per `RawCase`. Pure and deterministic: no
/// I/O, no clocks, and duplicate case ids within a run are a fatal error.
pub struct RecordBuilder {
    seen: HashSet<String>,
    source_label: String,
    split: String,
}

impl RecordBuilder {
    pub fn new<S: Into<String>, T: Into<String>>(source_label: S, split: T) -> Self {
        Self {
            seen: HashSet::new(),
            source_label: source_label.into(),
            split: split.into(),
        }
    }

    pub fn build(&mut self, case: &RawCase, note: SoapNote) -> Result<DatasetRecord> {
        if !self.seen.insert(case.id.clone()) {
            return Err(EtlError::IdentifierCollision(case.id.clone()));
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), json!(self.source_label));
        metadata.insert("split".to_string(), json!(self.split));
        metadata.insert("turns".to_string(), json!(case.turns.len()));
        if let Some(presenting) = &case.presenting_complaint {
            metadata.insert("presenting_complaint".to_string(), json!(presenting));
        }

        Ok(DatasetRecord {
            id: case.id.clone(),
            transcript: case.transcript_text(),
            note,
            metadata,
        })
    }
}
