use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::MISSING_SECTION;

/// Which side of the consultation a transcript turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Doctor,
    Patient,
}

impl Speaker {
    pub fn as_label(&self) -> &'static str {
        match self {
            Speaker::Doctor => "DOCTOR",
            Speaker::Patient => "PATIENT",
        }
    }
}

/// A single time-aligned utterance from one speaker.
#[derive(Debug, Clone)]
pub struct Turn {
    pub speaker: Speaker,
    /// Seconds from the start of the recording; used only for ordering.
    pub start: f64,
    pub text: String,
}

/// One dataset entry as found in the source: a consultation id, the merged
/// speaker turns, and the clinician's free-text note. Read-only after load.
#[derive(Debug, Clone)]
pub struct RawCase {
    pub id: String,
    pub turns: Vec<Turn>,
    pub note_text: String,
    pub presenting_complaint: Option<String>,
}

impl RawCase {
    /// Render the turns as a speaker-tagged transcript, one utterance per line.
    pub fn transcript_text(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker.as_label(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The four canonical sections of a SOAP note, in label-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoapSection {
    Subjective,
    Objective,
    Assessment,
    Plan,
}

impl SoapSection {
    pub const ALL: [SoapSection; 4] = [
        SoapSection::Subjective,
        SoapSection::Objective,
        SoapSection::Assessment,
        SoapSection::Plan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoapSection::Subjective => "subjective",
            SoapSection::Objective => "objective",
            SoapSection::Assessment => "assessment",
            SoapSection::Plan => "plan",
        }
    }
}

/// The canonical structured note. Every field is always present; a field the
/// segmenter could not extract holds the `MISSING` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapNote {
    pub subjective: String,
    pub objective: String,
    pub assessment: String,
    pub plan: String,
}

impl SoapNote {
    /// A note with all four fields set to the sentinel.
    pub fn missing() -> Self {
        Self {
            subjective: MISSING_SECTION.to_string(),
            objective: MISSING_SECTION.to_string(),
            assessment: MISSING_SECTION.to_string(),
            plan: MISSING_SECTION.to_string(),
        }
    }

    pub fn section(&self, section: SoapSection) -> &str {
        match section {
            SoapSection::Subjective => &self.subjective,
            SoapSection::Objective => &self.objective,
            SoapSection::Assessment => &self.assessment,
            SoapSection::Plan => &self.plan,
        }
    }

    pub fn is_missing(&self, section: SoapSection) -> bool {
        self.section(section) == MISSING_SECTION
    }

    /// True iff no field holds the sentinel.
    pub fn is_complete(&self) -> bool {
        SoapSection::ALL.iter().all(|s| !self.is_missing(*s))
    }
}

/// The unit persisted to the dataset artifacts and handed to the sink.
/// Field order here is the serialized line layout; metadata keys are sorted
/// so repeated runs serialize byte-identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub transcript: String,
    #[serde(flatten)]
    pub note: SoapNote,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl DatasetRecord {
    pub fn is_complete(&self) -> bool {
        self.note.is_complete()
    }
}

/// Outcome of a batch insert into the dataset sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertResult {
    pub inserted: usize,
}
