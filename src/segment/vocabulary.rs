use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::SoapSection;

/// One row of the header table: a section tag plus the label variants that
/// open it. Rows are checked in declaration order, so the first section whose
/// vocabulary matches a line wins.
pub struct LabelRule {
    pub section: SoapSection,
    pub labels: &'static [&'static str],
}

/// Label variants inventoried from the note corpus. Extending the segmenter
/// to a new shorthand means adding a variant here; the matching code does not
/// change.
pub static VOCABULARY: &[LabelRule] = &[
    LabelRule {
        section: SoapSection::Subjective,
        labels: &[
            "S", "Subj", "Subjective", "PC", "HPC", "Hx", "H/O", "History",
            "Chief Complaint", "CC", "PMH", "DHx", "SH", "ICE", "FH",
        ],
    },
    LabelRule {
        section: SoapSection::Objective,
        labels: &[
            "O", "Obj", "Objective", "O/E", "Ex", "Exam", "Examination",
            "Vitals", "VS", "Physical Exam", "PE",
        ],
    },
    LabelRule {
        section: SoapSection::Assessment,
        labels: &[
            "A", "Ass", "Assessment", "Imp", "Impression", "Dx", "Diagnosis",
            "Working Dx", "Differential", "DDx",
        ],
    },
    LabelRule {
        section: SoapSection::Plan,
        labels: &[
            "P", "Pln", "Plan", "Follow-up", "FU", "Review", "Management",
            "Mx", "Treatment", "Rx",
        ],
    },
];

// A header line is a label at the start of the line followed by a colon,
// hyphen, or en dash; whatever follows the delimiter is section content.
static HEADER_PATTERNS: Lazy<Vec<(SoapSection, Regex)>> = Lazy::new(|| {
    VOCABULARY
        .iter()
        .map(|rule| {
            let alternatives = rule
                .labels
                .iter()
                .map(|label| regex::escape(label))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"^\s*(?i:{})\s*[:\-–]\s*(.*)$", alternatives);
            let re = Regex::new(&pattern).expect("header pattern must compile");
            (rule.section, re)
        })
        .collect()
});

/// Match one note line against the header table. Returns the section the
/// line opens and the rest of the line after the delimiter.
pub fn match_header(line: &str) -> Option<(SoapSection, &str)> {
    for (section, re) in HEADER_PATTERNS.iter() {
        if let Some(caps) = re.captures(line) {
            let rest = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            return Some((*section, rest));
        }
    }
    None
}
