use serde::Serialize;

use crate::constants::MISSING_SECTION;
use crate::domain::{SoapNote, SoapSection};

pub mod vocabulary;

/// Trait for turning one free-text clinician note into a structured note.
/// Segmentation never fails; unparsable input degrades to `MISSING` fields.
pub trait Segmenter {
    fn segment(&self, note: &str) -> SoapNote;
}

/// Line-oriented segmenter driven by the declarative header vocabulary.
///
/// Once a line opens a section, everything up to the next recognized header
/// belongs to that section; re-opening a section appends to it. Text before
/// the first header is dropped.
pub struct HeaderSegmenter;

impl HeaderSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeaderSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter for HeaderSegmenter {
    fn segment(&self, note: &str) -> SoapNote {
        let mut buckets: [Vec<&str>; 4] = Default::default();
        let mut current: Option<usize> = None;

        for line in note.lines() {
            if let Some((section, rest)) = vocabulary::match_header(line) {
                let idx = section_index(section);
                current = Some(idx);
                if !rest.trim().is_empty() {
                    buckets[idx].push(rest);
                }
            } else if let Some(idx) = current {
                buckets[idx].push(line);
            }
            // Lines before the first recognized header are discarded.
        }

        let extract = |idx: usize| -> String {
            let text = buckets[idx].join("\n");
            let trimmed = text.trim();
            if trimmed.is_empty() {
                MISSING_SECTION.to_string()
            } else {
                trimmed.to_string()
            }
        };

        SoapNote {
            subjective: extract(0),
            objective: extract(1),
            assessment: extract(2),
            plan: extract(3),
        }
    }
}

fn section_index(section: SoapSection) -> usize {
    match section {
        SoapSection::Subjective => 0,
        SoapSection::Objective => 1,
        SoapSection::Assessment => 2,
        SoapSection::Plan => 3,
    }
}

/// Placeholder statistics for one build run, threaded through the batch call
/// and returned with the output rather than held in global state.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SegmentReport {
    pub notes_seen: usize,
    /// Notes that yielded no content for any section.
    pub unsegmentable: usize,
    pub missing_subjective: usize,
    pub missing_objective: usize,
    pub missing_assessment: usize,
    pub missing_plan: usize,
}

impl SegmentReport {
    pub fn observe(&mut self, note: &SoapNote) {
        self.notes_seen += 1;
        if note.is_missing(SoapSection::Subjective) {
            self.missing_subjective += 1;
        }
        if note.is_missing(SoapSection::Objective) {
            self.missing_objective += 1;
        }
        if note.is_missing(SoapSection::Assessment) {
            self.missing_assessment += 1;
        }
        if note.is_missing(SoapSection::Plan) {
            self.missing_plan += 1;
        }
        if SoapSection::ALL.iter().all(|s| note.is_missing(*s)) {
            self.unsegmentable += 1;
        }
    }
}
